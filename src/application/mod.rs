//! Application Layer - Use cases
//!
//! - `fetcher`: paced, rate-limit aware batch price fetching with early stop
//! - `service`: the wallet valuation pipeline used by the HTTP and CLI adapters

pub mod fetcher;
pub mod service;

pub use fetcher::{BatchOutcome, FetchReport, FetcherConfig, PriceFetcher, RATE_LIMIT_RETRIES};
pub use service::{
    PipelineSettings, TokensResponse, ValuationError, ValuationService, WalletValuation,
};
