//! Helius DAS response types
//!
//! Only the envelope is typed. Items are read field by field so one odd asset
//! cannot fail the whole page.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::RawBalance;
use crate::ports::BalanceError;

/// Asset interfaces that carry a fungible balance
pub const FUNGIBLE_INTERFACES: [&str; 2] = ["FungibleToken", "FungibleAsset"];

/// JSON-RPC envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<AssetList>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AssetList {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// One page of `getAssetsByOwner`
#[derive(Debug, Clone, PartialEq)]
pub struct AssetsPage {
    /// Fungible balances on this page
    pub balances: Vec<RawBalance>,
    /// Items returned before filtering, used to decide whether to page on
    pub item_count: usize,
}

/// Parse a `getAssetsByOwner` response body
///
/// A JSON-RPC error object becomes `BalanceError::Provider` with its message.
pub fn parse_assets_page(body: &[u8]) -> Result<AssetsPage, BalanceError> {
    let response: RpcResponse =
        serde_json::from_slice(body).map_err(|e| BalanceError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        tracing::debug!("Helius RPC error {}: {}", error.code, error.message);
        return Err(BalanceError::Provider(error.message));
    }

    let items = response
        .result
        .ok_or_else(|| BalanceError::Parse("response has neither result nor error".to_string()))?
        .items;

    let item_count = items.len();
    let balances = items.iter().filter_map(fungible_balance).collect();

    Ok(AssetsPage { balances, item_count })
}

/// Balance record for a fungible asset; `None` for anything else
///
/// A fungible asset whose `token_info` is missing or malformed yields a zero
/// balance, which normalization drops.
fn fungible_balance(item: &Value) -> Option<RawBalance> {
    let interface = item.get("interface").and_then(Value::as_str)?;
    if !FUNGIBLE_INTERFACES.contains(&interface) {
        return None;
    }
    let id = item.get("id").and_then(Value::as_str)?;

    let Some(info) = item.get("token_info").and_then(Value::as_object) else {
        return Some(RawBalance::new(id, 0, None));
    };

    let balance = info
        .get("balance")
        .and_then(|b| b.as_u64().map(i128::from).or_else(|| b.as_str()?.parse().ok()))
        .unwrap_or(0);
    let decimals = info
        .get("decimals")
        .and_then(Value::as_u64)
        .and_then(|d| u8::try_from(d).ok());

    Some(RawBalance::new(id, balance, decimals))
}
