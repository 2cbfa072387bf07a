use crate::domain::series::{CountPoint, ProductSeries};
use crate::engine::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inbound payload shared by every transport: a window plus the raw per-product counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRequest {
    #[serde(default)]
    pub window_days: Option<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub series: Vec<SeriesPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub points: Vec<CountPoint>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub window_days: Option<u32>,
    pub end_date: Option<NaiveDate>,
    pub series: Vec<ProductSeries>,
}

impl SeriesRequest {
    pub fn validate_and_into_series(self) -> Result<ValidatedRequest, EngineError> {
        let mut seen_ids = BTreeSet::<i64>::new();
        let mut series = Vec::with_capacity(self.series.len());
        for payload in self.series {
            if !seen_ids.insert(payload.product_id) {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate product_id: {}",
                    payload.product_id
                )));
            }
            series.push(payload.validate_and_into_series()?);
        }

        Ok(ValidatedRequest {
            window_days: self.window_days,
            end_date: self.end_date,
            series,
        })
    }
}

impl SeriesPayload {
    fn validate_and_into_series(self) -> Result<ProductSeries, EngineError> {
        let name = self.product_name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "product {}: product_name must be non-empty",
                self.product_id
            )));
        }

        let category = self
            .category
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Clients do not always send points in date order; duplicates are still rejected below.
        let mut points = self.points;
        points.sort_by_key(|p| p.date);

        ProductSeries::new(self.product_id, name, category, points)
    }
}
