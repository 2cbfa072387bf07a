use crate::domain::recommendation::{RecommendationItem, RecommendationMetrics};
use crate::domain::series::ProductSeries;
use crate::engine::{explain, metrics, round2, score, EngineError};

pub fn recommend(series: &ProductSeries) -> Result<RecommendationItem, EngineError> {
    let summary = metrics::summarize(series)?;
    let breakdown = score::score(series, &summary)?;

    let explanation = explain::explain(
        series.product_name(),
        summary.growth_rate,
        breakdown.inverted_consistency,
        breakdown.turnover_proxy,
        summary.average_daily_demand,
    );

    Ok(RecommendationItem {
        product_id: series.product_id(),
        product_name: series.product_name().to_string(),
        category: series.category().map(str::to_string),
        score: breakdown.score,
        explanation,
        metrics: RecommendationMetrics {
            growth_rate: round2(summary.growth_rate),
            consistency: round2(breakdown.inverted_consistency),
            turnover_proxy: round2(breakdown.turnover_proxy),
            average_demand: round2(summary.average_daily_demand),
        },
    })
}

/// Scores every series and orders the results by score, highest first.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank(series: &[ProductSeries]) -> Result<Vec<RecommendationItem>, EngineError> {
    let mut items = series
        .iter()
        .map(recommend)
        .collect::<Result<Vec<_>, _>>()?;

    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::CountPoint;
    use chrono::NaiveDate;

    fn series(id: i64, counts: &[i64]) -> ProductSeries {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let points = counts
            .iter()
            .enumerate()
            .map(|(i, c)| CountPoint::new(start + chrono::Duration::days(i as i64), *c))
            .collect();
        ProductSeries::new(id, format!("P{id}"), Some("snacks".to_string()), points).unwrap()
    }

    #[test]
    fn item_carries_rounded_metrics() {
        let item = recommend(&series(2, &[5, 10, 15])).unwrap();
        assert_eq!(item.score, 74.42);
        assert_eq!(item.metrics.growth_rate, 50.0);
        assert_eq!(item.metrics.consistency, 59.18);
        assert_eq!(item.metrics.turnover_proxy, 66.67);
        assert_eq!(item.metrics.average_demand, 10.0);
        assert_eq!(item.category.as_deref(), Some("snacks"));
        assert!(item.explanation.starts_with("P2 shows Strong demand growth"));
    }

    #[test]
    fn orders_by_score_descending() {
        let out = rank(&[
            series(1, &[5, 5, 5]),
            series(2, &[5, 10, 15]),
            series(3, &[1, 9, 1, 9]),
        ])
        .unwrap();
        let ids: Vec<i64> = out.iter().map(|i| i.product_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let out = rank(&[
            series(9, &[4, 4, 4]),
            series(3, &[7, 7, 7]),
            series(5, &[2, 2, 2]),
        ])
        .unwrap();
        assert!(out.iter().all(|i| i.score == 70.0));
        let ids: Vec<i64> = out.iter().map(|i| i.product_id).collect();
        assert_eq!(ids, vec![9, 3, 5]);
    }

    #[test]
    fn short_series_fails_the_whole_ranking() {
        let err = rank(&[series(1, &[5, 5, 5]), series(2, &[1, 1])]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData { product_id: 2, .. }
        ));
    }
}
