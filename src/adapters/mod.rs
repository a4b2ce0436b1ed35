//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and the outer surfaces:
//! - Helius: wallet balances via the DAS `getAssetsByOwner` method
//! - Price Feed: DexScreener / Jupiter batch price lookups
//! - HTTP: axum router with the health check and valuation endpoint
//! - CLI: Command-line interface handlers

pub mod helius;
pub mod price_feed;
pub mod http;
pub mod cli;

pub use helius::HeliusClient;
pub use price_feed::{HttpPriceProvider, PriceSourceKind};
pub use cli::CliApp;
