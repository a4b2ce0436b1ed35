use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::{normalize_address, PriceInfo, RawBalance};
use super::balances::{BalanceError, BalanceProvider};
use super::prices::{PriceFetchError, PriceProvider};

/// Mock price provider that records batches and allows scripted failures
///
/// Each call first consumes the next scripted step: `Some(error)` fails the
/// call, `None` (or an exhausted script) answers from the configured prices.
#[derive(Debug, Clone)]
pub struct MockPriceProvider {
    prices: HashMap<String, PriceInfo>,
    script: Arc<Mutex<VecDeque<Option<PriceFetchError>>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    max_batch_size: usize,
}

impl Default for MockPriceProvider {
    fn default() -> Self {
        Self {
            prices: HashMap::new(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            max_batch_size: 100,
        }
    }
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the price for an address
    pub fn with_price(mut self, address: &str, price: f64) -> Self {
        let info = PriceInfo::new(price).unwrap_or_default();
        self.prices.insert(normalize_address(address), info);
        self
    }

    /// Builder method to set full price info for an address
    pub fn with_price_info(mut self, address: &str, info: PriceInfo) -> Self {
        self.prices.insert(normalize_address(address), info);
        self
    }

    /// Next call fails with `error`
    pub fn then_fail(self, error: PriceFetchError) -> Self {
        self.script.lock().unwrap().push_back(Some(error));
        self
    }

    /// Next call answers normally
    pub fn then_succeed(self) -> Self {
        self.script.lock().unwrap().push_back(None);
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Get all recorded batches, in call order
    pub fn get_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn fetch_prices(
        &self,
        addresses: &[String],
    ) -> Result<Vec<(String, PriceInfo)>, PriceFetchError> {
        self.calls.lock().unwrap().push(addresses.to_vec());

        if let Some(Some(error)) = self.script.lock().unwrap().pop_front() {
            return Err(error);
        }

        Ok(addresses
            .iter()
            .filter_map(|a| {
                self.prices
                    .get(&normalize_address(a))
                    .map(|info| (a.clone(), info.clone()))
            })
            .collect())
    }
}

/// Mock balance provider returning a fixed set of balances or a provider error
#[derive(Debug, Clone, Default)]
pub struct MockBalanceProvider {
    balances: Vec<RawBalance>,
    error: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBalanceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a balance record
    pub fn with_balance(mut self, address: &str, raw_balance: i128, decimals: u8) -> Self {
        self.balances.push(RawBalance::new(address, raw_balance, Some(decimals)));
        self
    }

    /// Builder method to make every call fail with a provider error payload
    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Get all wallets queried
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceProvider for MockBalanceProvider {
    async fn fetch_balances(&self, wallet: &str) -> Result<Vec<RawBalance>, BalanceError> {
        self.calls.lock().unwrap().push(wallet.to_string());
        match &self.error {
            Some(message) => Err(BalanceError::Provider(message.clone())),
            None => Ok(self.balances.clone()),
        }
    }
}
