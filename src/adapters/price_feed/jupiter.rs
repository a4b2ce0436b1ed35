//! Jupiter flat price responses
//!
//! `GET /price/v2?ids=a,b,c` returns `{ "data": { "<mint>": { "price": "1.23" } | null } }`.
//! Older deployments send numeric prices and a `mintSymbol`; both are accepted.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{parse_price, PriceInfo};
use crate::ports::PriceFetchError;
use super::parser::{base, PriceResponseParser};

pub const JUPITER_PRICE_API: &str = "https://api.jup.ag/price/v2";

/// Jupiter accepts up to 100 ids per request
pub const JUPITER_MAX_BATCH: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct JupiterParser;

impl PriceResponseParser for JupiterParser {
    fn name(&self) -> &'static str {
        "jupiter"
    }

    fn max_batch_size(&self) -> usize {
        JUPITER_MAX_BATCH
    }

    fn request_url(&self, base_url: &str, addresses: &[String]) -> String {
        format!("{}?ids={}", base(base_url), addresses.join(","))
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<(String, PriceInfo)>, PriceFetchError> {
        let response: PriceResponse = serde_json::from_slice(body)
            .map_err(|e| PriceFetchError::InvalidResponse(e.to_string()))?;

        let mut prices: Vec<(String, PriceInfo)> = response
            .data
            .into_iter()
            .filter_map(|(mint, entry)| entry_price(entry?).map(|info| (mint, info)))
            .collect();
        // HashMap order is arbitrary; keep output deterministic
        prices.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(prices)
    }
}

/// An entry is either `{ "price": ... }` or a bare price
fn entry_price(entry: Value) -> Option<PriceInfo> {
    match entry {
        Value::Object(obj) => {
            let price = obj.get("price").and_then(parse_price)?;
            let symbol = obj
                .get("mintSymbol")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(PriceInfo::new(price)?.with_metadata(None, symbol, None))
        }
        other => PriceInfo::new(parse_price(&other)?),
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: HashMap<String, Option<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Vec<(String, PriceInfo)> {
        JupiterParser.parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_request_url() {
        let url = JupiterParser.request_url(
            JUPITER_PRICE_API,
            &["So11111111111111111111111111111111111111112".to_string(), "b".to_string()],
        );
        assert_eq!(
            url,
            "https://api.jup.ag/price/v2?ids=So11111111111111111111111111111111111111112,b"
        );
    }

    #[test]
    fn test_string_and_numeric_prices() {
        let prices = parse(json!({
            "data": {
                "a": { "id": "a", "price": "1.5" },
                "b": { "id": "b", "price": 2.5, "mintSymbol": "BEE" }
            }
        }));

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].0, "a");
        assert_eq!(prices[0].1.price, 1.5);
        assert_eq!(prices[1].1.price, 2.5);
        assert_eq!(prices[1].1.symbol.as_deref(), Some("BEE"));
    }

    #[test]
    fn test_bare_price_mapping() {
        let prices = parse(json!({ "data": { "a": "0.25", "b": 4 } }));
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].1.price, 0.25);
        assert_eq!(prices[1].1.price, 4.0);
    }

    #[test]
    fn test_null_and_invalid_entries_skipped() {
        let prices = parse(json!({
            "data": {
                "null": null,
                "noprice": { "id": "noprice" },
                "negative": { "price": "-3" },
                "ok": { "price": "0.1" }
            }
        }));
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].0, "ok");
    }

    #[test]
    fn test_missing_data_is_empty() {
        assert!(parse(json!({ "timeTaken": 0.1 })).is_empty());
    }

    #[test]
    fn test_invalid_body() {
        assert!(matches!(
            JupiterParser.parse(b"not json"),
            Err(PriceFetchError::InvalidResponse(_))
        ));
    }
}
