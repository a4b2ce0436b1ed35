//! Ports Layer - Trait definitions for external providers
//!
//! Following hexagonal architecture, these traits abstract:
//! - Balance lookups (wallet -> raw token balances)
//! - Price lookups (batch of token addresses -> USD prices)
//!
//! `mocks` holds in-memory implementations used by unit and integration tests.

pub mod balances;
pub mod prices;
pub mod mocks;

pub use balances::{BalanceError, BalanceProvider};
pub use prices::{PriceFetchError, PriceProvider};
