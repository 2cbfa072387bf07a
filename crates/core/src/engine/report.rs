use crate::domain::analytics::{AnalyticsResponse, DailyProductCount, DailySummary};
use crate::domain::recommendation::RecommendationsResponse;
use crate::domain::series::ProductSeries;
use crate::engine::{checked_total, metrics, rank, EngineError, MIN_ANALYTICS_POINTS, MIN_RECOMMENDATION_POINTS};
use crate::time::window::ReportWindow;
use chrono::{DateTime, NaiveDate, Utc};

/// Summaries for every product with at least two points inside `window`.
pub fn analytics_report(
    window: ReportWindow,
    series: &[ProductSeries],
) -> Result<AnalyticsResponse, EngineError> {
    let eligible = eligible_series(window, series, MIN_ANALYTICS_POINTS);

    let products = eligible
        .iter()
        .map(metrics::summarize)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalyticsResponse {
        start_date: window.start,
        end_date: window.end,
        products,
    })
}

/// Ranked recommendations for every product with at least three points inside `window`.
pub fn recommendation_report(
    window: ReportWindow,
    series: &[ProductSeries],
    generated_at: DateTime<Utc>,
) -> Result<RecommendationsResponse, EngineError> {
    let eligible = eligible_series(window, series, MIN_RECOMMENDATION_POINTS);
    let recommendations = rank::rank(&eligible)?;

    Ok(RecommendationsResponse {
        week_start: window.start,
        week_end: window.end,
        recommendations,
        generated_at,
    })
}

pub fn daily_summary(
    date: NaiveDate,
    products: Vec<DailyProductCount>,
) -> Result<DailySummary, EngineError> {
    let total_items = checked_total(products.iter().map(|p| p.count)).ok_or_else(|| {
        EngineError::InvalidInput(format!("total item count for {date} overflows i64"))
    })?;

    Ok(DailySummary {
        date,
        total_products: products.len(),
        total_items,
        products,
    })
}

fn eligible_series(
    window: ReportWindow,
    series: &[ProductSeries],
    min_points: usize,
) -> Vec<ProductSeries> {
    series
        .iter()
        .map(|s| s.within(&window))
        .filter(|s| {
            let keep = s.len() >= min_points;
            if !keep {
                tracing::debug!(
                    product_id = s.product_id(),
                    points = s.len(),
                    min_points,
                    "skipping product with too few points in window"
                );
            }
            keep
        })
        .collect()
}
