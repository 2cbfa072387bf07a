use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub product_id: i64,
    pub product_name: String,
    pub average_daily_demand: f64,
    /// Percent of average demand gained (or lost) per day along the fitted line.
    pub growth_rate: f64,
    /// Coefficient of variation in percent; lower is steadier.
    pub demand_consistency: f64,
    pub total_count: i64,
    pub days_analyzed: usize,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub products: Vec<AnalyticsSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProductCount {
    pub product_id: i64,
    pub product_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_products: usize,
    pub total_items: i64,
    pub products: Vec<DailyProductCount>,
}
