use crate::domain::analytics::{AnalyticsSummary, Trend};
use crate::domain::series::ProductSeries;
use crate::engine::{checked_total, EngineError, MIN_ANALYTICS_POINTS};
use chrono::NaiveDate;

pub fn summarize(series: &ProductSeries) -> Result<AnalyticsSummary, EngineError> {
    analytics(
        series.product_id(),
        series.product_name(),
        &series.counts(),
        &series.dates(),
    )
}

/// Average demand, normalized linear growth and coefficient of variation for one product.
///
/// Growth and consistency are reported as `0` when average demand is zero; an all-zero series
/// therefore reads as flat and perfectly consistent.
pub fn analytics(
    product_id: i64,
    product_name: &str,
    counts: &[i64],
    dates: &[NaiveDate],
) -> Result<AnalyticsSummary, EngineError> {
    if counts.len() != dates.len() {
        return Err(EngineError::InvalidInput(format!(
            "product {product_id}: {} counts but {} dates",
            counts.len(),
            dates.len()
        )));
    }
    if counts.len() < MIN_ANALYTICS_POINTS {
        return Err(EngineError::InsufficientData {
            product_id,
            required: MIN_ANALYTICS_POINTS,
            actual: counts.len(),
        });
    }
    if counts.iter().any(|c| *c < 0) {
        return Err(EngineError::InvalidInput(format!(
            "product {product_id}: counts must be non-negative"
        )));
    }
    if dates.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(EngineError::InvalidInput(format!(
            "product {product_id}: dates must be strictly ascending"
        )));
    }

    let total_count = checked_total(counts.iter().copied()).ok_or_else(|| {
        EngineError::InvalidInput(format!("product {product_id}: total count overflows i64"))
    })?;

    let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
    let average = mean(&values);

    let growth_rate = if average > 0.0 {
        (ols_slope(&values) / average) * 100.0
    } else {
        0.0
    };

    let demand_consistency = if average > 0.0 {
        (population_std_dev(&values) / average) * 100.0
    } else {
        0.0
    };

    Ok(AnalyticsSummary {
        product_id,
        product_name: product_name.to_string(),
        average_daily_demand: average,
        growth_rate,
        demand_consistency,
        total_count,
        days_analyzed: counts.len(),
        trend: trend_direction(counts),
    })
}

/// Compares the mean of the later half of the window against the earlier half.
///
/// A shift larger than half a standard deviation counts as a trend.
pub fn trend_direction(counts: &[i64]) -> Trend {
    if counts.len() < 2 {
        return Trend::Stable;
    }

    let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
    let mid = values.len() / 2;
    let diff = mean(&values[mid..]) - mean(&values[..mid]);
    let threshold = population_std_dev(&values) * 0.5;

    if diff > threshold {
        Trend::Increasing
    } else if diff < -threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Least-squares slope of `values` against their index `0..n`.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den == 0.0 {
        return 0.0;
    }
    num / den
}
