//! HTTP Price Provider
//!
//! One request per batch. Retry and pacing belong to the fetcher; this client
//! only classifies each response (429, other status, transport, body).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::PriceInfo;
use crate::ports::{PriceFetchError, PriceProvider};
use super::parser::{PriceResponseParser, PriceSourceKind};

/// Configuration for the HttpPriceProvider
#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    pub source: PriceSourceKind,
    /// Base URL of the provider API
    pub api_url: String,
    /// Optional API key, sent as `x-api-key`
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self::for_source(PriceSourceKind::default())
    }
}

impl PriceFeedConfig {
    /// Config pointing at a source's public API
    pub fn for_source(source: PriceSourceKind) -> Self {
        Self {
            source,
            api_url: source.default_api_url().to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Price provider over HTTP, parameterised by response shape
#[derive(Debug)]
pub struct HttpPriceProvider {
    config: PriceFeedConfig,
    parser: Box<dyn PriceResponseParser>,
    http: Client,
}

impl HttpPriceProvider {
    pub fn new(config: PriceFeedConfig) -> Result<Self, PriceFetchError> {
        let parser = config.source.parser();
        Self::with_parser(config, parser)
    }

    /// Use a custom parser instead of the one selected by `config.source`
    pub fn with_parser(
        config: PriceFeedConfig,
        parser: Box<dyn PriceResponseParser>,
    ) -> Result<Self, PriceFetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PriceFetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, parser, http })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    /// URL used for a batch
    pub fn batch_url(&self, addresses: &[String]) -> String {
        self.parser.request_url(&self.config.api_url, addresses)
    }
}

#[async_trait]
impl PriceProvider for HttpPriceProvider {
    fn name(&self) -> &str {
        self.parser.name()
    }

    fn max_batch_size(&self) -> usize {
        self.parser.max_batch_size()
    }

    async fn fetch_prices(
        &self,
        addresses: &[String],
    ) -> Result<Vec<(String, PriceInfo)>, PriceFetchError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.http.get(self.batch_url(addresses));
        if let Some(ref api_key) = self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceFetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceFetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        self.parser.parse(&body)
    }
}
