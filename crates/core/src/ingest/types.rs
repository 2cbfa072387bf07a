use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-product counts produced by one shelf capture (detector output, already aggregated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountBatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub product_name: String,
    pub count: i64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountBatchReceipt {
    pub date: NaiveDate,
    pub detections: Vec<Detection>,
    pub total_products: i64,
}

/// A batch that passed validation, with one count per product name.
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    pub date: NaiveDate,
    pub detections: Vec<Detection>,
    /// Last count seen per product name; a later detection overwrites an earlier one.
    pub counts: BTreeMap<String, i64>,
    /// Sum of every detection's count.
    pub total: i64,
}

impl CountBatch {
    pub fn validate(self, default_date: NaiveDate) -> Result<ValidatedBatch> {
        ensure!(!self.detections.is_empty(), "detections must be non-empty");

        let mut detections = Vec::with_capacity(self.detections.len());
        let mut counts = BTreeMap::new();
        for det in self.detections {
            let det = validate_detection(det)?;
            counts.insert(det.product_name.clone(), det.count);
            detections.push(det);
        }

        let total = crate::engine::checked_total(detections.iter().map(|d| d.count))
            .context("total detection count overflows i64")?;

        Ok(ValidatedBatch {
            date: self.date.unwrap_or(default_date),
            detections,
            counts,
            total,
        })
    }
}

impl ValidatedBatch {
    pub fn into_receipt(self) -> CountBatchReceipt {
        CountBatchReceipt {
            date: self.date,
            total_products: self.total,
            detections: self.detections,
        }
    }
}

fn validate_detection(det: Detection) -> Result<Detection> {
    let product_name = det.product_name.trim().to_string();
    ensure!(!product_name.is_empty(), "product_name must be non-empty");
    ensure!(
        det.count >= 0,
        "count must be non-negative (got {} for {product_name})",
        det.count
    );
    ensure!(
        (0.0..=1.0).contains(&det.confidence),
        "confidence must be between 0 and 1 (got {} for {product_name})",
        det.confidence
    );

    Ok(Detection {
        product_name,
        count: det.count,
        confidence: det.confidence,
    })
}
