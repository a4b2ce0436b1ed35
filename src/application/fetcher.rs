//! Price Fetcher
//!
//! Executes a `FetchPlan` against a `PriceProvider`, one batch at a time.
//!
//! Rate-limit defense is two-layered:
//! - proactive: a pacing delay before every batch except the first
//! - reactive: on HTTP 429, wait a fixed backoff and retry the batch once
//!
//! A failed batch never aborts the fetch. Its addresses stay unpriced and the
//! loop moves on. Requests are strictly sequential, so there is never more
//! than one request in flight against the provider.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{FetchPlan, PriceInfo, PriceMap};
use crate::ports::{PriceFetchError, PriceProvider};

/// Retries allowed for a rate-limited batch
pub const RATE_LIMIT_RETRIES: u32 = 1;

const DEFAULT_PACING_MS: u64 = 1000;
const DEFAULT_RATE_LIMIT_BACKOFF_MS: u64 = 5000;

/// Fetcher timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Delay before each non-first batch
    pub pacing: Duration,
    /// Delay before retrying a rate-limited batch
    pub rate_limit_backoff: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            rate_limit_backoff: Duration::from_millis(DEFAULT_RATE_LIMIT_BACKOFF_MS),
        }
    }
}

impl FetcherConfig {
    /// No delays at all (tests, local providers)
    pub fn immediate() -> Self {
        Self {
            pacing: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
        }
    }
}

/// Result of processing one batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Request succeeded with this many priced addresses
    Success { prices: usize },
    /// First attempt was rate limited; this is how the retry went
    Retried(Box<BatchOutcome>),
    /// Rate limited on the first attempt and on every retry
    RateLimitExhausted,
    /// Non-success HTTP status other than 429
    ProviderError(u16),
    /// Transport failure
    NetworkError(String),
    /// Response arrived but could not be parsed
    InvalidResponse(String),
    /// Not fetched because early-stop fired first
    Skipped,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            BatchOutcome::Success { .. } => true,
            BatchOutcome::Retried(inner) => inner.is_success(),
            _ => false,
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success() && *self != BatchOutcome::Skipped
    }

    fn from_error(error: PriceFetchError) -> Self {
        match error {
            PriceFetchError::RateLimited => BatchOutcome::RateLimitExhausted,
            PriceFetchError::Status(status) => BatchOutcome::ProviderError(status),
            PriceFetchError::Network(message) => BatchOutcome::NetworkError(message),
            PriceFetchError::InvalidResponse(message) => BatchOutcome::InvalidResponse(message),
        }
    }
}

/// Diagnostics for one fetch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    /// One entry per planned batch, in plan order
    pub outcomes: Vec<BatchOutcome>,
    pub batches_planned: usize,
    pub batches_attempted: usize,
    pub batches_skipped: usize,
    pub batches_failed: usize,
    /// HTTP requests issued, retries included
    pub requests_sent: usize,
    /// Price entries received across all successful batches
    pub prices_found: usize,
    pub early_stopped: bool,
}

impl FetchReport {
    fn new(batches_planned: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(batches_planned),
            batches_planned,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: BatchOutcome, prices: usize) {
        self.batches_attempted += 1;
        self.prices_found += prices;
        if outcome.is_failure() {
            self.batches_failed += 1;
        }
        self.outcomes.push(outcome);
    }

    fn skip_remaining(&mut self) {
        let remaining = self.batches_planned - self.outcomes.len();
        self.batches_skipped += remaining;
        self.outcomes
            .extend(std::iter::repeat(BatchOutcome::Skipped).take(remaining));
    }
}

/// Sequential, paced batch fetcher
#[derive(Clone)]
pub struct PriceFetcher {
    provider: Arc<dyn PriceProvider>,
    config: FetcherConfig,
}

impl PriceFetcher {
    pub fn new(provider: Arc<dyn PriceProvider>, config: FetcherConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch every batch in the plan
    pub async fn fetch(&self, plan: &FetchPlan) -> (PriceMap, FetchReport) {
        self.fetch_until(plan, |_| false).await
    }

    /// Fetch batches until `should_stop` returns true
    ///
    /// `should_stop` sees the accumulated prices after each processed batch.
    /// Once it fires, the remaining batches are recorded as skipped and never
    /// requested.
    pub async fn fetch_until<F>(&self, plan: &FetchPlan, mut should_stop: F) -> (PriceMap, FetchReport)
    where
        F: FnMut(&PriceMap) -> bool + Send,
    {
        let mut prices = PriceMap::new();
        let mut report = FetchReport::new(plan.len());

        for (index, batch) in plan.batches().iter().enumerate() {
            if index > 0 && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }

            let (outcome, pairs) = self.fetch_batch(batch, &mut report).await;
            let found = prices.merge(pairs);

            tracing::debug!(
                "Batch {}/{} ({} addresses) via {}: {:?}",
                index + 1,
                plan.len(),
                batch.len(),
                self.provider.name(),
                outcome
            );
            report.record(outcome, found);

            if should_stop(&prices) {
                if index + 1 < plan.len() {
                    tracing::info!(
                        "Early stop after batch {}/{}, skipping {} batches",
                        index + 1,
                        plan.len(),
                        plan.len() - index - 1
                    );
                }
                report.early_stopped = true;
                break;
            }
        }

        report.skip_remaining();
        (prices, report)
    }

    /// One batch: request, and on 429 back off and retry
    async fn fetch_batch(
        &self,
        batch: &[String],
        report: &mut FetchReport,
    ) -> (BatchOutcome, Vec<(String, PriceInfo)>) {
        let mut attempt = 0;

        loop {
            report.requests_sent += 1;
            let result = self.provider.fetch_prices(batch).await;

            let (outcome, pairs) = match result {
                Err(PriceFetchError::RateLimited) if attempt < RATE_LIMIT_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        "Rate limited (429) by {}, backing off for {:?} (retry {}/{})",
                        self.provider.name(),
                        self.config.rate_limit_backoff,
                        attempt,
                        RATE_LIMIT_RETRIES
                    );
                    tokio::time::sleep(self.config.rate_limit_backoff).await;
                    continue;
                }
                Ok(pairs) => (BatchOutcome::Success { prices: pairs.len() }, pairs),
                Err(error) => {
                    tracing::warn!("Price batch failed on {}: {}", self.provider.name(), error);
                    (BatchOutcome::from_error(error), Vec::new())
                }
            };

            let outcome = match outcome {
                BatchOutcome::RateLimitExhausted => outcome,
                other if attempt > 0 => BatchOutcome::Retried(Box::new(other)),
                other => other,
            };
            return (outcome, pairs);
        }
    }
}
