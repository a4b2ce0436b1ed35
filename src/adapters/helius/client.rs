//! Helius Balance Client
//!
//! Lists a wallet's fungible tokens with the DAS `getAssetsByOwner` method.
//! Pages are requested while the previous page came back full.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::domain::RawBalance;
use crate::ports::{BalanceError, BalanceProvider};
use super::types::{parse_assets_page, AssetsPage};

pub const HELIUS_RPC_URL: &str = "https://mainnet.helius-rpc.com";

/// Configuration for the HeliusClient
#[derive(Debug, Clone)]
pub struct HeliusConfig {
    /// DAS RPC endpoint
    pub api_url: String,
    /// Sent as the `api-key` query parameter
    pub api_key: String,
    /// Items per page (DAS allows up to 1000)
    pub page_limit: u32,
    /// Hard cap on pages per wallet
    pub max_pages: u32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HeliusConfig {
    fn default() -> Self {
        Self {
            api_url: HELIUS_RPC_URL.to_string(),
            api_key: String::new(),
            page_limit: 1000,
            max_pages: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HeliusConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// BalanceProvider backed by the Helius DAS API
#[derive(Debug, Clone)]
pub struct HeliusClient {
    config: HeliusConfig,
    http: Client,
}

impl HeliusClient {
    pub fn new(config: HeliusConfig) -> Result<Self, BalanceError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HeliusConfig {
        &self.config
    }

    /// JSON-RPC body for one page
    pub fn request_body(&self, wallet: &str, page: u32) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": "meme-tracker",
            "method": "getAssetsByOwner",
            "params": {
                "ownerAddress": wallet,
                "page": page,
                "limit": self.config.page_limit,
                "displayOptions": {
                    "showFungible": true
                }
            }
        })
    }

    async fn fetch_page(
        &self,
        wallet: &str,
        page: u32,
    ) -> Result<AssetsPage, BalanceError> {
        let url = format!("{}/", self.config.api_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .query(&[("api-key", self.config.api_key.as_str())])
            .json(&self.request_body(wallet, page))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // Helius reports bad params as 4xx with a JSON-RPC error body
        match parse_assets_page(&body) {
            Err(BalanceError::Provider(message)) => Err(BalanceError::Provider(message)),
            _ if !status.is_success() => Err(BalanceError::Status(status.as_u16())),
            result => result,
        }
    }
}

#[async_trait]
impl BalanceProvider for HeliusClient {
    async fn fetch_balances(&self, wallet: &str) -> Result<Vec<RawBalance>, BalanceError> {
        let mut balances = Vec::new();

        for page in 1..=self.config.max_pages.max(1) {
            let assets = self.fetch_page(wallet, page).await?;
            tracing::debug!(
                "Helius page {} for {}: {} items, {} fungible",
                page,
                wallet,
                assets.item_count,
                assets.balances.len()
            );
            balances.extend(assets.balances);

            if assets.item_count < self.config.page_limit as usize {
                return Ok(balances);
            }
        }

        tracing::warn!(
            "Wallet {} still had assets after {} pages, results truncated",
            wallet,
            self.config.max_pages
        );
        Ok(balances)
    }
}
