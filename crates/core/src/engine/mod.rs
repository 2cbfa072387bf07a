//! Demand analytics and restocking scores.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared state. Callers load
//! [`ProductSeries`](crate::domain::series::ProductSeries) values however they like and hand
//! them to [`report`] (or the individual stages) to get summaries and ranked recommendations.

pub mod error;
pub mod explain;
pub mod metrics;
pub mod rank;
pub mod report;
pub mod score;

pub use error::EngineError;

/// Fewest points a series needs for an analytics summary.
pub const MIN_ANALYTICS_POINTS: usize = 2;

/// Fewest points a series needs to be scored and ranked.
pub const MIN_RECOMMENDATION_POINTS: usize = 3;

/// Sum of non-negative counts, or `None` once it no longer fits in an `i64`.
pub fn checked_total(counts: impl IntoIterator<Item = i64>) -> Option<i64> {
    counts.into_iter().try_fold(0_i64, |acc, c| acc.checked_add(c))
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
