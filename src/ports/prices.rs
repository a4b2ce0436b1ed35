//! Price provider port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PriceInfo;

/// Failure of a single batch lookup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceFetchError {
    #[error("Rate limited (429)")]
    RateLimited,
    #[error("Price provider returned status {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid price response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PriceFetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 429 => PriceFetchError::RateLimited,
            Some(status) => PriceFetchError::Status(status.as_u16()),
            None if err.is_decode() => PriceFetchError::InvalidResponse(err.to_string()),
            None => PriceFetchError::Network(err.to_string()),
        }
    }
}

/// A USD price source queried one batch of addresses at a time
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Largest batch the provider accepts in one request
    fn max_batch_size(&self) -> usize;

    /// Look up prices for one batch, in a single request
    ///
    /// Addresses the provider does not know are simply absent from the result.
    async fn fetch_prices(
        &self,
        addresses: &[String],
    ) -> Result<Vec<(String, PriceInfo)>, PriceFetchError>;
}
