use crate::engine::EngineError;
use crate::time::window::ReportWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountPoint {
    pub date: NaiveDate,
    pub count: i64,
}

impl CountPoint {
    pub fn new(date: NaiveDate, count: i64) -> Self {
        Self { date, count }
    }
}

/// One product's daily counts, strictly ascending by date with no negative counts.
///
/// The fields are private so every instance goes through [`ProductSeries::new`]; the engine
/// relies on that ordering when it indexes points for the trend fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSeries {
    product_id: i64,
    product_name: String,
    category: Option<String>,
    points: Vec<CountPoint>,
}

impl ProductSeries {
    pub fn new(
        product_id: i64,
        product_name: impl Into<String>,
        category: Option<String>,
        points: Vec<CountPoint>,
    ) -> Result<Self, EngineError> {
        if let Some(p) = points.iter().find(|p| p.count < 0) {
            return Err(EngineError::InvalidInput(format!(
                "product {product_id}: negative count {} on {}",
                p.count, p.date
            )));
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(EngineError::InvalidInput(format!(
                    "product {product_id}: dates must be strictly ascending ({} then {})",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self {
            product_id,
            product_name: product_name.into(),
            category,
            points,
        })
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn points(&self) -> &[CountPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn counts(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.count).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Copy of this series restricted to the points inside `window`.
    pub fn within(&self, window: &ReportWindow) -> Self {
        Self {
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            category: self.category.clone(),
            points: self
                .points
                .iter()
                .filter(|p| window.contains(p.date))
                .copied()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn accepts_gaps_between_dates() {
        let s = ProductSeries::new(
            1,
            "Milk",
            None,
            vec![CountPoint::new(d(1), 3), CountPoint::new(d(4), 5)],
        )
        .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.counts(), vec![3, 5]);
    }

    #[test]
    fn rejects_negative_counts() {
        let err = ProductSeries::new(1, "Milk", None, vec![CountPoint::new(d(1), -1)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn rejects_duplicate_and_descending_dates() {
        let dup = vec![CountPoint::new(d(2), 1), CountPoint::new(d(2), 2)];
        assert!(ProductSeries::new(1, "Milk", None, dup).is_err());

        let desc = vec![CountPoint::new(d(3), 1), CountPoint::new(d(2), 2)];
        assert!(ProductSeries::new(1, "Milk", None, desc).is_err());
    }

    #[test]
    fn within_drops_points_outside_window() {
        let s = ProductSeries::new(
            7,
            "Bread",
            Some("bakery".to_string()),
            vec![
                CountPoint::new(d(1), 1),
                CountPoint::new(d(5), 2),
                CountPoint::new(d(9), 3),
            ],
        )
        .unwrap();
        let window = ReportWindow::new(d(7), 3).unwrap();
        let trimmed = s.within(&window);
        assert_eq!(trimmed.counts(), vec![2]);
        assert_eq!(trimmed.category(), Some("bakery"));
    }
}
