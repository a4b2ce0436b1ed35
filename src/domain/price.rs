//! Price information and the per-request price map

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::holding::normalize_address;

/// USD price of a token plus optional display metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    /// Price in USD (never negative)
    pub price: f64,
    /// 24h price change percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PriceInfo {
    /// Price-only info; negative or non-finite prices are rejected
    pub fn new(price: f64) -> Option<Self> {
        if !price.is_finite() || price < 0.0 {
            return None;
        }
        Some(Self { price, ..Default::default() })
    }

    pub fn with_change_24h(mut self, change: Option<f64>) -> Self {
        self.change_24h = change.filter(|c| c.is_finite());
        self
    }

    pub fn with_metadata(
        mut self,
        name: Option<String>,
        symbol: Option<String>,
        icon: Option<String>,
    ) -> Self {
        self.name = name;
        self.symbol = symbol;
        self.icon = icon;
        self
    }
}

/// Parse a provider price that may arrive as a string ("0.0123") or a number
pub fn parse_price(value: &serde_json::Value) -> Option<f64> {
    let price = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// Token address (lower-cased) to price
///
/// Merging is last-write-wins. Batches are address-disjoint so overwrites
/// only happen when a provider repeats itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceMap {
    prices: HashMap<String, PriceInfo>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one entry, returning the previous value for that address
    pub fn insert(&mut self, address: &str, info: PriceInfo) -> Option<PriceInfo> {
        self.prices.insert(normalize_address(address), info)
    }

    /// Merge a batch of `(address, info)` pairs, returning how many were applied
    pub fn merge<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, PriceInfo)>,
    {
        let mut merged = 0;
        for (address, info) in pairs {
            if self.insert(&address, info).is_some() {
                tracing::debug!(address = %address, "Price overwritten by later batch");
            }
            merged += 1;
        }
        merged
    }

    /// Case-insensitive lookup
    pub fn get(&self, address: &str) -> Option<&PriceInfo> {
        self.prices.get(&normalize_address(address))
    }

    /// Price for an address, 0 when unknown
    pub fn price_of(&self, address: &str) -> f64 {
        self.get(address).map(|p| p.price).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, PriceInfo)> for PriceMap {
    fn from_iter<T: IntoIterator<Item = (String, PriceInfo)>>(iter: T) -> Self {
        let mut map = PriceMap::new();
        map.merge(iter);
        map
    }
}
