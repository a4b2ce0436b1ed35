//! Helius DAS Contract Tests
//!
//! Golden `getAssetsByOwner` fixtures, checked against the page parser.
//!
//! Fixtures are immutable once committed - any changes require explicit justification.

#[cfg(test)]
mod assets_contract_tests {
    use serde_json::Value;

    use crate::adapters::helius::parse_assets_page;
    use crate::domain::{normalize_balances, RawBalance};
    use crate::ports::BalanceError;

    fn fixture_bytes(name: &str) -> Vec<u8> {
        let fixture_path = format!(
            "{}/fixtures/helius/{}.json",
            env!("CARGO_MANIFEST_DIR"),
            name
        );
        std::fs::read(&fixture_path).unwrap_or_else(|e| {
            panic!(
                "CONTRACT VIOLATION: Failed to load fixture '{}': {}",
                fixture_path, e
            )
        })
    }

    #[test]
    fn test_items_have_interface_and_id() {
        let fixture: Value = serde_json::from_slice(&fixture_bytes("assets_page")).unwrap();
        let items = fixture["result"]["items"]
            .as_array()
            .expect("CONTRACT VIOLATION: 'result.items' must be an array");

        for item in items {
            for field in ["interface", "id"] {
                assert!(
                    item.get(field).and_then(Value::as_str).is_some(),
                    "CONTRACT VIOLATION: Field '{}' is missing from asset {}",
                    field,
                    item
                );
            }
        }
    }

    #[test]
    fn test_page_parses_fungible_balances() {
        let page = parse_assets_page(&fixture_bytes("assets_page")).unwrap();

        assert_eq!(page.item_count, 5);
        // NFT dropped, malformed token_info kept as zero
        assert_eq!(page.balances.len(), 4);
        assert_eq!(
            page.balances[0],
            RawBalance::new("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 125_000_000_000, Some(5))
        );
        assert_eq!(
            page.balances[3],
            RawBalance::new("MalformedInfoMint11111111111111111111111111", 0, None)
        );
    }

    #[test]
    fn test_page_normalizes_to_two_holdings() {
        let page = parse_assets_page(&fixture_bytes("assets_page")).unwrap();
        let holdings = normalize_balances(page.balances);

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].ui_amount(), 1_250_000.0);
        assert_eq!(holdings[0].decimals(), 5);
        assert_eq!(holdings[1].ui_amount(), 42.0);
    }

    #[test]
    fn test_error_fixture_carries_message() {
        let err = parse_assets_page(&fixture_bytes("error")).unwrap_err();
        match err {
            BalanceError::Provider(message) => {
                assert_eq!(message, "Invalid params: invalid owner address")
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
