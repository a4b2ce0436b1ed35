//! Wallet holdings
//!
//! Converts raw on-chain balance records into typed holdings with a
//! human-readable amount. Zero and negative balances never become a `Holding`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw balance record as reported by a balance provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBalance {
    /// Token mint address (records without one are skipped)
    pub token_address: Option<String>,
    /// Balance in base units
    pub raw_balance: i128,
    /// Decimal places of the mint (0 when unknown)
    pub decimals: Option<u8>,
}

impl RawBalance {
    pub fn new(token_address: impl Into<String>, raw_balance: i128, decimals: Option<u8>) -> Self {
        Self {
            token_address: Some(token_address.into()),
            raw_balance,
            decimals,
        }
    }
}

/// Amount of a token held, in UI units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub ui_amount: f64,
    pub decimals: u8,
}

/// A wallet's positive balance of one token
///
/// Serializes to the public response shape:
/// `{ "tokenAddress": "...", "tokenAmount": { "uiAmount": 1.5, "decimals": 6 } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub token_address: String,
    pub token_amount: TokenAmount,
}

impl Holding {
    /// Build a holding, rejecting non-positive or non-finite amounts
    pub fn new(token_address: impl Into<String>, ui_amount: f64, decimals: u8) -> Option<Self> {
        if !ui_amount.is_finite() || ui_amount <= 0.0 {
            return None;
        }
        Some(Self {
            token_address: token_address.into(),
            token_amount: TokenAmount { ui_amount, decimals },
        })
    }

    pub fn ui_amount(&self) -> f64 {
        self.token_amount.ui_amount
    }

    pub fn decimals(&self) -> u8 {
        self.token_amount.decimals
    }

    /// Lower-cased address used as the price lookup key
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.token_address)
    }
}

/// Case-insensitive address key
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Convert a raw base-unit balance into UI units (`raw / 10^decimals`)
///
/// Exact decimal division when the value fits a 28-digit scale, f64 otherwise.
pub fn ui_amount(raw_balance: i128, decimals: u8) -> f64 {
    match Decimal::try_from_i128_with_scale(raw_balance, u32::from(decimals)) {
        Ok(value) => value.to_f64().unwrap_or(0.0),
        Err(_) => raw_balance as f64 / 10f64.powi(i32::from(decimals)),
    }
}

/// Normalize raw balance records into holdings
///
/// Keeps input order. Records without an address, with a balance <= 0, or whose
/// UI amount rounds to <= 0 are dropped.
pub fn normalize_balances<I>(records: I) -> Vec<Holding>
where
    I: IntoIterator<Item = RawBalance>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let address = record.token_address.filter(|a| !a.trim().is_empty())?;
            if record.raw_balance <= 0 {
                return None;
            }
            let decimals = record.decimals.unwrap_or(0);
            Holding::new(address, ui_amount(record.raw_balance, decimals), decimals)
        })
        .collect()
}
