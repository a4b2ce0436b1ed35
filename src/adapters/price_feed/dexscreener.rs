//! DexScreener trading-pair responses
//!
//! `GET /latest/dex/tokens/{a,b,c}` returns `{ "pairs": [...] }` (or `null`);
//! the newer `/tokens/v1/{chain}/{ids}` returns the pair array directly.
//! A token usually trades in several pairs, so the most liquid pair wins.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{normalize_address, parse_price, PriceInfo};
use crate::ports::PriceFetchError;
use super::parser::{base, PriceResponseParser};

pub const DEXSCREENER_API: &str = "https://api.dexscreener.com";

/// DexScreener accepts at most 30 addresses per request
pub const DEXSCREENER_MAX_BATCH: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct DexScreenerParser;

impl PriceResponseParser for DexScreenerParser {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    fn max_batch_size(&self) -> usize {
        DEXSCREENER_MAX_BATCH
    }

    fn request_url(&self, base_url: &str, addresses: &[String]) -> String {
        format!("{}/latest/dex/tokens/{}", base(base_url), addresses.join(","))
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<(String, PriceInfo)>, PriceFetchError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PriceFetchError::InvalidResponse(e.to_string()))?;

        let pairs = match value {
            Value::Array(pairs) => pairs,
            Value::Object(mut obj) => match obj.remove("pairs") {
                Some(Value::Array(pairs)) => pairs,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(PriceFetchError::InvalidResponse(format!(
                        "expected pairs array, got {}",
                        other
                    )))
                }
            },
            other => {
                return Err(PriceFetchError::InvalidResponse(format!(
                    "unexpected response: {}",
                    other
                )))
            }
        };

        Ok(select_most_liquid(pairs))
    }
}

/// Keep one pair per base token: highest USD liquidity, first seen on ties
fn select_most_liquid(pairs: Vec<Value>) -> Vec<(String, PriceInfo)> {
    let mut selected: Vec<(String, f64, PriceInfo)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in pairs {
        let pair: DexPair = match serde_json::from_value(raw) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::debug!("Skipping malformed DexScreener pair: {}", e);
                continue;
            }
        };
        let Some(info) = pair.price_info() else {
            continue;
        };
        let liquidity = pair.liquidity_usd();
        let key = normalize_address(&pair.base_token.address);

        match index.get(&key).copied() {
            Some(i) if liquidity > selected[i].1 => {
                selected[i] = (pair.base_token.address, liquidity, info);
            }
            Some(_) => {}
            None => {
                index.insert(key, selected.len());
                selected.push((pair.base_token.address, liquidity, info));
            }
        }
    }

    selected
        .into_iter()
        .map(|(address, _, info)| (address, info))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    base_token: DexToken,
    #[serde(default)]
    price_usd: Option<Value>,
    #[serde(default)]
    price_change: Option<DexPriceChange>,
    #[serde(default)]
    liquidity: Option<DexLiquidity>,
    #[serde(default)]
    info: Option<DexPairInfo>,
}

impl DexPair {
    fn price_info(&self) -> Option<PriceInfo> {
        let price = self.price_usd.as_ref().and_then(parse_price)?;
        let info = PriceInfo::new(price)?
            .with_change_24h(self.price_change.as_ref().and_then(|c| c.h24))
            .with_metadata(
                self.base_token.name.clone(),
                self.base_token.symbol.clone(),
                self.info.as_ref().and_then(|i| i.image_url.clone()),
            );
        Some(info)
    }

    fn liquidity_usd(&self) -> f64 {
        self.liquidity
            .as_ref()
            .and_then(|l| l.usd)
            .filter(|usd| usd.is_finite())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct DexToken {
    address: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DexPriceChange {
    #[serde(default)]
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DexLiquidity {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPairInfo {
    #[serde(default)]
    image_url: Option<String>,
}
