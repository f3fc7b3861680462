//! Top-N category ranking.

use crate::aggregate::CategoryTotals;
use crate::normalize::Amount;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCategory {
    pub label: String,
    pub total: Amount,
}

/// The `n` largest categories, largest first.
///
/// The sort is stable, so equal totals keep first-seen order. An empty input
/// gives an empty output; deciding that this means "no data" is the caller's
/// job.
pub fn top_categories(totals: &CategoryTotals, n: usize) -> Vec<RankedCategory> {
    totals
        .sorted_desc()
        .into_iter()
        .take(n)
        .map(|b| RankedCategory {
            label: b.label.clone(),
            total: b.total,
        })
        .collect()
}
