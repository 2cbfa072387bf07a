use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub recommendations: Vec<RecommendationItem>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub product_id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub score: f64,
    pub explanation: String,
    pub metrics: RecommendationMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetrics {
    pub growth_rate: f64,
    pub consistency: f64,
    pub turnover_proxy: f64,
    pub average_demand: f64,
}
