//! Batch planning for price lookups
//!
//! Partitions token addresses into request batches no larger than a provider's
//! per-request limit. With amount prioritization the largest balances land in
//! the earliest batches, which is what makes early-stop worthwhile.

use super::holding::Holding;

/// Ordered, immutable list of address batches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    batches: Vec<Vec<String>>,
}

impl FetchPlan {
    pub fn batches(&self) -> &[Vec<String>] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of addresses across all batches
    pub fn address_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Split addresses into batches of at most `batch_size`
///
/// A `batch_size` of 0 is treated as 1.
pub fn plan_addresses<I, S>(addresses: I, batch_size: usize) -> FetchPlan
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
    let batches = addresses
        .chunks(batch_size.max(1))
        .map(<[String]>::to_vec)
        .collect();
    FetchPlan { batches }
}

/// Plan batches for a set of holdings
///
/// When `prioritize_by_amount` is set, holdings are ordered by UI amount
/// descending before partitioning (stable, so equal amounts keep input order).
pub fn plan_batches(holdings: &[Holding], batch_size: usize, prioritize_by_amount: bool) -> FetchPlan {
    let mut ordered: Vec<&Holding> = holdings.iter().collect();
    if prioritize_by_amount {
        ordered.sort_by(|a, b| b.ui_amount().total_cmp(&a.ui_amount()));
    }
    plan_addresses(ordered.into_iter().map(|h| h.token_address.clone()), batch_size)
}
