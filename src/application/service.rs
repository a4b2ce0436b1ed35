//! Wallet Valuation Service
//!
//! End-to-end pipeline for one request:
//! balances -> holdings -> fetch plan -> prices (with early stop) -> ranked holdings.
//!
//! Only missing input and balance-provider failures abort a request. Price
//! provider failures degrade to unpriced holdings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    into_holdings, normalize_balances, plan_batches, Holding, PriceMap, ValuationPolicy,
    ValuedHolding, Valuator,
};
use crate::ports::{BalanceError, BalanceProvider, PriceProvider};
use super::fetcher::{FetchReport, FetcherConfig, PriceFetcher};

/// Request-level failures
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Wallet address is required")]
    MissingInput,
    /// Balance provider rejected the request; carries its message
    #[error("{0}")]
    UpstreamProvider(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BalanceError> for ValuationError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Provider(message) => ValuationError::UpstreamProvider(message),
            other => ValuationError::Internal(other.to_string()),
        }
    }
}

/// Public response body: `{ "tokens": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: Vec<Holding>,
}

/// Batching and ranking settings for the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub prioritize_by_amount: bool,
    pub policy: ValuationPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: 30,
            prioritize_by_amount: true,
            policy: ValuationPolicy::value_floor(10.0),
        }
    }
}

/// Full result of valuing one wallet
#[derive(Debug, Clone)]
pub struct WalletValuation {
    pub wallet: String,
    /// Holdings found before any filtering
    pub holdings_found: usize,
    /// Ranked holdings with their prices and USD values
    pub ranked: Vec<ValuedHolding>,
    pub report: FetchReport,
}

impl WalletValuation {
    /// Holdings in their public shape, rank order
    pub fn tokens(&self) -> Vec<Holding> {
        into_holdings(self.ranked.clone())
    }

    pub fn into_response(self) -> TokensResponse {
        TokensResponse {
            tokens: into_holdings(self.ranked),
        }
    }

    pub fn total_usd_value(&self) -> f64 {
        self.ranked.iter().map(|v| v.usd_value).sum()
    }
}

/// Values wallets against a balance provider and a price provider
#[derive(Clone)]
pub struct ValuationService {
    balances: Arc<dyn BalanceProvider>,
    fetcher: PriceFetcher,
    batch_size: usize,
    settings: PipelineSettings,
}

impl ValuationService {
    pub fn new(
        balances: Arc<dyn BalanceProvider>,
        prices: Arc<dyn PriceProvider>,
        fetcher_config: FetcherConfig,
        settings: PipelineSettings,
    ) -> Self {
        let batch_size = settings.batch_size.clamp(1, prices.max_batch_size().max(1));
        if batch_size != settings.batch_size {
            tracing::warn!(
                "Batch size {} clamped to {} for {}",
                settings.batch_size,
                batch_size,
                prices.name()
            );
        }

        Self {
            balances,
            fetcher: PriceFetcher::new(prices, fetcher_config),
            batch_size,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Value a wallet with the configured policy
    pub async fn value_wallet(&self, wallet: &str) -> Result<TokensResponse, ValuationError> {
        self.value_wallet_detailed(wallet, &self.settings.policy)
            .await
            .map(WalletValuation::into_response)
    }

    /// Value a wallet with an explicit policy, keeping prices and diagnostics
    pub async fn value_wallet_detailed(
        &self,
        wallet: &str,
        policy: &ValuationPolicy,
    ) -> Result<WalletValuation, ValuationError> {
        let wallet = wallet.trim();
        if wallet.is_empty() {
            return Err(ValuationError::MissingInput);
        }

        tracing::info!("Valuing wallet {}", wallet);

        let raw = self.balances.fetch_balances(wallet).await.map_err(|e| {
            tracing::warn!("Balance lookup failed for {}: {}", wallet, e);
            ValuationError::from(e)
        })?;

        let holdings = normalize_balances(raw);
        let plan = plan_batches(&holdings, self.batch_size, self.settings.prioritize_by_amount);
        let valuator = Valuator::new(policy.clone());

        tracing::info!(
            "Found {} holdings, fetching prices in {} batches of <= {} from {}",
            holdings.len(),
            plan.len(),
            self.batch_size,
            self.fetcher.provider_name()
        );

        let (prices, report) = if policy.early_stop_target.is_some() {
            self.fetcher
                .fetch_until(&plan, |prices: &PriceMap| valuator.early_stop_reached(&holdings, prices))
                .await
        } else {
            self.fetcher.fetch(&plan).await
        };

        let ranked = valuator.rank(&holdings, &prices);

        tracing::info!(
            "Wallet {}: {} prices from {}/{} batches ({} failed, {} skipped), returning {} tokens",
            wallet,
            report.prices_found,
            report.batches_attempted,
            report.batches_planned,
            report.batches_failed,
            report.batches_skipped,
            ranked.len()
        );

        Ok(WalletValuation {
            wallet: wallet.to_string(),
            holdings_found: holdings.len(),
            ranked,
            report,
        })
    }
}
