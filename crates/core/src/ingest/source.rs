use crate::domain::analytics::AnalyticsResponse;
use crate::domain::recommendation::RecommendationsResponse;
use crate::domain::series::ProductSeries;
use crate::engine::report;
use crate::time::window::ReportWindow;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Supplies per-product count series for a report window.
#[async_trait::async_trait]
pub trait SeriesSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn load_series(&self, window: ReportWindow) -> Result<Vec<ProductSeries>>;
}

/// Series already held in memory, e.g. decoded from a request payload or a file.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeriesSource {
    series: Vec<ProductSeries>,
}

impl InMemorySeriesSource {
    pub fn new(series: Vec<ProductSeries>) -> Self {
        Self { series }
    }
}

#[async_trait::async_trait]
impl SeriesSource for InMemorySeriesSource {
    fn source_name(&self) -> &'static str {
        "in_memory"
    }

    async fn load_series(&self, window: ReportWindow) -> Result<Vec<ProductSeries>> {
        Ok(self
            .series
            .iter()
            .map(|s| s.within(&window))
            .filter(|s| !s.is_empty())
            .collect())
    }
}

pub async fn analytics_from(
    source: &dyn SeriesSource,
    window: ReportWindow,
) -> Result<AnalyticsResponse> {
    let series = source.load_series(window).await?;
    tracing::debug!(
        source = source.source_name(),
        start = %window.start,
        end = %window.end,
        products = series.len(),
        "loaded series for analytics"
    );
    Ok(report::analytics_report(window, &series)?)
}

pub async fn recommendations_from(
    source: &dyn SeriesSource,
    window: ReportWindow,
    generated_at: DateTime<Utc>,
) -> Result<RecommendationsResponse> {
    let series = source.load_series(window).await?;
    tracing::debug!(
        source = source.source_name(),
        start = %window.start,
        end = %window.end,
        products = series.len(),
        "loaded series for recommendations"
    );
    Ok(report::recommendation_report(window, &series, generated_at)?)
}
