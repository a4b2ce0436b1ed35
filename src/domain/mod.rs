//! Domain Layer - Core valuation logic
//!
//! Pure types and functions with no I/O. Providers are reached through the
//! ports layer; everything here is deterministic for a given input.
//!
//! - `holding`: raw balance normalization into `Holding`
//! - `batch`: partitioning of token addresses into provider-sized batches
//! - `price`: `PriceInfo` and the case-insensitive `PriceMap`
//! - `valuation`: USD valuation, floor/cap policy and early-stop counting

pub mod holding;
pub mod batch;
pub mod price;
pub mod valuation;

pub use holding::{normalize_address, normalize_balances, Holding, RawBalance, TokenAmount};
pub use batch::{plan_addresses, plan_batches, FetchPlan};
pub use price::{parse_price, PriceInfo, PriceMap};
pub use valuation::{into_holdings, ValuationPolicy, ValuedHolding, Valuator};
