//! Balance provider port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RawBalance;

#[derive(Debug, Error)]
pub enum BalanceError {
    /// The provider answered with an error payload
    #[error("{0}")]
    Provider(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Balance provider returned status {0}")]
    Status(u16),
    #[error("Failed to parse balance response: {0}")]
    Parse(String),
}

/// Source of a wallet's fungible token balances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Raw balances for every fungible token held by `wallet`
    ///
    /// Records without usable token info come back as zero balances or are
    /// omitted; they are never an error.
    async fn fetch_balances(&self, wallet: &str) -> Result<Vec<RawBalance>, BalanceError>;
}
