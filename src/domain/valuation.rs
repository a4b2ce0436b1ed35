//! Holding valuation
//!
//! Prices each holding in USD, then filters, ranks and truncates the result
//! according to a `ValuationPolicy`. Also answers the early-stop question for
//! the price fetcher: how many holdings already qualify?

use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::price::{PriceInfo, PriceMap};

/// Filtering and ranking policy
///
/// "Everything worth at least $10" and "top 100 by value" are both just
/// configurations of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationPolicy {
    /// Minimum USD value to keep a holding (0 = no floor)
    pub min_usd_value: f64,
    /// Maximum number of holdings returned (None = unbounded)
    pub max_results: Option<usize>,
    /// Stop fetching prices once this many holdings qualify (None = disabled)
    pub early_stop_target: Option<usize>,
}

impl Default for ValuationPolicy {
    fn default() -> Self {
        Self {
            min_usd_value: 0.0,
            max_results: None,
            early_stop_target: None,
        }
    }
}

impl ValuationPolicy {
    /// Every holding worth at least `min_usd_value`, unbounded count
    pub fn value_floor(min_usd_value: f64) -> Self {
        Self {
            min_usd_value,
            ..Default::default()
        }
    }

    /// The `n` most valuable holdings, no floor
    pub fn top_n(n: usize) -> Self {
        Self {
            max_results: Some(n),
            ..Default::default()
        }
    }

    pub fn with_min_usd_value(mut self, min_usd_value: f64) -> Self {
        self.min_usd_value = min_usd_value;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_early_stop(mut self, target: Option<usize>) -> Self {
        self.early_stop_target = target;
        self
    }
}

/// A holding with its resolved price and USD value
///
/// Internal ranking type; `into_holdings` strips the valuation before output.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedHolding {
    pub holding: Holding,
    pub price: Option<PriceInfo>,
    pub usd_value: f64,
}

impl ValuedHolding {
    pub fn is_priced(&self) -> bool {
        self.price.is_some()
    }

    pub fn symbol(&self) -> Option<&str> {
        self.price.as_ref().and_then(|p| p.symbol.as_deref())
    }
}

/// Strip valuation data, keeping rank order
pub fn into_holdings(valued: Vec<ValuedHolding>) -> Vec<Holding> {
    valued.into_iter().map(|v| v.holding).collect()
}

/// Applies a `ValuationPolicy` to holdings and prices
#[derive(Debug, Clone, Default)]
pub struct Valuator {
    policy: ValuationPolicy,
}

impl Valuator {
    pub fn new(policy: ValuationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValuationPolicy {
        &self.policy
    }

    /// Price every holding, in input order, unfiltered
    pub fn value(&self, holdings: &[Holding], prices: &PriceMap) -> Vec<ValuedHolding> {
        holdings.iter().map(|h| value_one(h, prices)).collect()
    }

    /// A holding qualifies when it has a known price and meets the floor
    pub fn qualifies(&self, valued: &ValuedHolding) -> bool {
        valued.is_priced() && valued.usd_value >= self.policy.min_usd_value
    }

    /// Number of holdings that currently qualify under `prices`
    pub fn count_qualifying(&self, holdings: &[Holding], prices: &PriceMap) -> usize {
        holdings
            .iter()
            .map(|h| value_one(h, prices))
            .filter(|v| self.qualifies(v))
            .count()
    }

    /// True once the early-stop target is enabled and met
    pub fn early_stop_reached(&self, holdings: &[Holding], prices: &PriceMap) -> bool {
        match self.policy.early_stop_target {
            Some(target) => self.count_qualifying(holdings, prices) >= target,
            None => false,
        }
    }

    /// Filter by floor, sort by USD value descending (stable), then cap
    pub fn rank(&self, holdings: &[Holding], prices: &PriceMap) -> Vec<ValuedHolding> {
        let mut ranked: Vec<ValuedHolding> = self
            .value(holdings, prices)
            .into_iter()
            .filter(|v| v.usd_value >= self.policy.min_usd_value)
            .collect();

        ranked.sort_by(|a, b| b.usd_value.total_cmp(&a.usd_value));

        if let Some(max) = self.policy.max_results {
            ranked.truncate(max);
        }
        ranked
    }

    /// Ranked holdings in their public shape
    pub fn apply(&self, holdings: &[Holding], prices: &PriceMap) -> Vec<Holding> {
        into_holdings(self.rank(holdings, prices))
    }
}

fn value_one(holding: &Holding, prices: &PriceMap) -> ValuedHolding {
    let price = prices.get(&holding.token_address).cloned();
    let usd_value = price
        .as_ref()
        .map(|p| holding.ui_amount() * p.price)
        .unwrap_or(0.0);
    ValuedHolding {
        holding: holding.clone(),
        price,
        usd_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn holding(address: &str, amount: f64) -> Holding {
        Holding::new(address, amount, 0).unwrap()
    }

    fn prices(entries: &[(&str, f64)]) -> PriceMap {
        entries
            .iter()
            .map(|(a, p)| (a.to_string(), PriceInfo::new(*p).unwrap()))
            .collect()
    }

    #[test]
    fn test_value_floor_keeps_exactly_one() {
        let holdings = vec![holding("A", 2.0), holding("B", 2.0)];
        let prices = prices(&[("a", 3.0), ("b", 20.0)]);

        let result = Valuator::new(ValuationPolicy::value_floor(10.0)).apply(&holdings, &prices);

        assert_eq!(result, vec![holding("B", 2.0)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "tokenAddress": "B", "tokenAmount": { "uiAmount": 2.0, "decimals": 0 } }])
        );
    }

    #[test]
    fn test_unpriced_holdings_value_zero() {
        let holdings = vec![holding("Known", 1.0), holding("Unknown", 1_000_000.0)];
        let prices = prices(&[("known", 0.5)]);

        let valued = Valuator::default().value(&holdings, &prices);
        assert_relative_eq!(valued[0].usd_value, 0.5);
        assert_eq!(valued[1].usd_value, 0.0);
        assert!(!valued[1].is_priced());
    }

    #[test]
    fn test_rank_sorts_descending() {
        let holdings = vec![holding("low", 1.0), holding("high", 100.0), holding("mid", 10.0)];
        let prices = prices(&[("low", 1.0), ("high", 1.0), ("mid", 1.0)]);

        let ranked = Valuator::default().rank(&holdings, &prices);
        let order: Vec<_> = ranked.iter().map(|v| v.holding.token_address.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let holdings = vec![holding("first", 2.0), holding("second", 1.0), holding("third", 4.0)];
        let prices = prices(&[("first", 1.0), ("second", 2.0), ("third", 0.5)]);

        let ranked = Valuator::default().rank(&holdings, &prices);
        let order: Vec<_> = ranked.iter().map(|v| v.holding.token_address.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_top_n_includes_unpriced_when_no_floor() {
        let holdings = vec![holding("priced", 1.0), holding("unpriced", 5.0), holding("other", 1.0)];
        let prices = prices(&[("priced", 2.0), ("other", 1.0)]);

        let result = Valuator::new(ValuationPolicy::top_n(3)).apply(&holdings, &prices);
        let order: Vec<_> = result.iter().map(|h| h.token_address.as_str()).collect();
        assert_eq!(order, vec!["priced", "other", "unpriced"]);

        let capped = Valuator::new(ValuationPolicy::top_n(1)).apply(&holdings, &prices);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].token_address, "priced");
    }

    #[test]
    fn test_filter_then_cap() {
        let holdings: Vec<Holding> = (1..=10).map(|i| holding(&format!("m{}", i), i as f64)).collect();
        let prices: PriceMap = (1..=10)
            .map(|i| (format!("m{}", i), PriceInfo::new(1.0).unwrap()))
            .collect();

        let policy = ValuationPolicy::value_floor(5.0).with_max_results(Some(3));
        let result = Valuator::new(policy).apply(&holdings, &prices);
        let order: Vec<_> = result.iter().map(|h| h.token_address.as_str()).collect();
        assert_eq!(order, vec!["m10", "m9", "m8"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let holdings = vec![holding("a", 3.0), holding("b", 3.0), holding("c", 1.0), holding("d", 7.0)];
        let prices = prices(&[("a", 2.0), ("b", 2.0), ("d", 0.1)]);
        let valuator = Valuator::new(ValuationPolicy::value_floor(0.5).with_max_results(Some(3)));

        assert_eq!(valuator.apply(&holdings, &prices), valuator.apply(&holdings, &prices));
    }

    #[test]
    fn test_monotonic_in_floor_and_cap() {
        let holdings: Vec<Holding> = (1..=25).map(|i| holding(&format!("t{}", i), i as f64)).collect();
        let prices: PriceMap = (1..=25)
            .filter(|i| i % 3 != 0)
            .map(|i| (format!("t{}", i), PriceInfo::new(0.75).unwrap()))
            .collect();

        let mut previous = usize::MAX;
        for floor in [0.0, 1.0, 2.5, 5.0, 10.0, 15.0, 50.0] {
            let count = Valuator::new(ValuationPolicy::value_floor(floor))
                .apply(&holdings, &prices)
                .len();
            assert!(count <= previous, "floor {} increased count", floor);
            previous = count;
        }

        for cap in [0usize, 1, 5, 10, 30] {
            let len = Valuator::new(ValuationPolicy::top_n(cap)).apply(&holdings, &prices).len();
            assert!(len <= cap);
        }
    }

    #[test]
    fn test_count_qualifying_requires_price() {
        let holdings = vec![holding("a", 10.0), holding("b", 1.0), holding("c", 50.0)];
        let prices = prices(&[("a", 2.0), ("b", 2.0)]);

        let valuator = Valuator::new(ValuationPolicy::value_floor(10.0));
        assert_eq!(valuator.count_qualifying(&holdings, &prices), 1);

        // With no floor, unpriced holdings still do not count
        assert_eq!(Valuator::default().count_qualifying(&holdings, &prices), 2);
    }

    #[test]
    fn test_early_stop_reached() {
        let holdings = vec![holding("a", 10.0), holding("b", 10.0)];
        let partial = prices(&[("a", 5.0)]);

        let disabled = Valuator::new(ValuationPolicy::value_floor(10.0));
        assert!(!disabled.early_stop_reached(&holdings, &partial));

        let one = Valuator::new(ValuationPolicy::value_floor(10.0).with_early_stop(Some(1)));
        assert!(one.early_stop_reached(&holdings, &partial));

        let two = Valuator::new(ValuationPolicy::value_floor(10.0).with_early_stop(Some(2)));
        assert!(!two.early_stop_reached(&holdings, &partial));
    }

    #[test]
    fn test_case_insensitive_price_lookup() {
        let holdings = vec![holding("MiXeD", 4.0)];
        let prices = prices(&[("MIXED", 2.5)]);
        let valued = Valuator::default().value(&holdings, &prices);
        assert_relative_eq!(valued[0].usd_value, 10.0);
    }
}
