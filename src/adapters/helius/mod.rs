//! Helius Adapter
//!
//! Implementation of the BalanceProvider port over the Helius DAS API.

mod client;
mod types;

pub use client::{HeliusClient, HeliusConfig, HELIUS_RPC_URL};
pub use types::{parse_assets_page, AssetsPage, FUNGIBLE_INTERFACES};

#[cfg(test)]
mod contract_tests;
