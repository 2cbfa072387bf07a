use crate::domain::analytics::AnalyticsSummary;
use crate::domain::series::ProductSeries;
use crate::engine::{round2, EngineError, MIN_RECOMMENDATION_POINTS};

// Each metric is clamped to [0, cap] and rescaled to its share of the 100-point budget.
const GROWTH_CAP: f64 = 50.0;
const GROWTH_POINTS: f64 = 30.0;
const CONSISTENCY_CAP: f64 = 100.0;
const CONSISTENCY_POINTS: f64 = 30.0;
const TURNOVER_CAP: f64 = 100.0;
const TURNOVER_POINTS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Composite in `[0, 100]`, rounded to 2 decimals.
    pub score: f64,
    pub growth_points: f64,
    pub consistency_points: f64,
    pub turnover_points: f64,
    /// `100 - demand_consistency`; higher means steadier demand.
    pub inverted_consistency: f64,
    /// Average demand as a percent of the peak observed day.
    pub turnover_proxy: f64,
}

pub fn score(
    series: &ProductSeries,
    summary: &AnalyticsSummary,
) -> Result<ScoreBreakdown, EngineError> {
    if series.len() < MIN_RECOMMENDATION_POINTS {
        return Err(EngineError::InsufficientData {
            product_id: series.product_id(),
            required: MIN_RECOMMENDATION_POINTS,
            actual: series.len(),
        });
    }
    if series.product_id() != summary.product_id {
        return Err(EngineError::InvalidInput(format!(
            "summary for product {} does not match series for product {}",
            summary.product_id,
            series.product_id()
        )));
    }

    let inverted_consistency = 100.0 - summary.demand_consistency;

    let max_count = series.points().iter().map(|p| p.count).max().unwrap_or(0);
    let turnover_proxy = if max_count > 0 {
        (summary.average_daily_demand / max_count as f64) * 100.0
    } else {
        0.0
    };

    let growth_points = growth_points(summary.growth_rate);
    let consistency_points = consistency_points(inverted_consistency);
    let turnover_points = turnover_points(turnover_proxy);

    Ok(ScoreBreakdown {
        score: round2(growth_points + consistency_points + turnover_points),
        growth_points,
        consistency_points,
        turnover_points,
        inverted_consistency,
        turnover_proxy,
    })
}

pub fn growth_points(growth_rate: f64) -> f64 {
    scaled(growth_rate, GROWTH_CAP, GROWTH_POINTS)
}

pub fn consistency_points(inverted_consistency: f64) -> f64 {
    scaled(inverted_consistency, CONSISTENCY_CAP, CONSISTENCY_POINTS)
}

pub fn turnover_points(turnover_proxy: f64) -> f64 {
    scaled(turnover_proxy, TURNOVER_CAP, TURNOVER_POINTS)
}

fn scaled(value: f64, cap: f64, points: f64) -> f64 {
    value.max(0.0).min(cap) / cap * points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::CountPoint;
    use crate::engine::metrics::summarize;
    use chrono::NaiveDate;

    fn series(id: i64, counts: &[i64]) -> ProductSeries {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let points = counts
            .iter()
            .enumerate()
            .map(|(i, c)| CountPoint::new(start + chrono::Duration::days(i as i64), *c))
            .collect();
        ProductSeries::new(id, format!("P{id}"), None, points).unwrap()
    }

    fn run(counts: &[i64]) -> ScoreBreakdown {
        let s = series(1, counts);
        let summary = summarize(&s).unwrap();
        score(&s, &summary).unwrap()
    }

    #[test]
    fn constant_series_scores_full_consistency_and_turnover() {
        let b = run(&[10, 10, 10, 10, 10, 10, 10]);
        assert_eq!(b.inverted_consistency, 100.0);
        assert_eq!(b.turnover_proxy, 100.0);
        assert_eq!(b.growth_points, 0.0);
        assert_eq!(b.score, 70.0);
    }

    #[test]
    fn growth_contribution_is_capped() {
        assert_eq!(growth_points(1000.0), 30.0);
        assert_eq!(growth_points(50.0), 30.0);
        assert_eq!(growth_points(25.0), 15.0);
        assert_eq!(growth_points(-40.0), 0.0);
    }

    #[test]
    fn consistency_and_turnover_are_clamped() {
        assert_eq!(consistency_points(-80.0), 0.0);
        assert_eq!(consistency_points(150.0), 30.0);
        assert_eq!(turnover_points(100.0), 40.0);
        assert_eq!(turnover_points(50.0), 20.0);
    }

    #[test]
    fn rising_series_matches_hand_computed_score() {
        let b = run(&[5, 10, 15]);
        // growth 50% -> 30, inverted CV ~59.18 -> ~17.75, turnover 66.67 -> ~26.67
        assert!((b.turnover_proxy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(b.score, 74.42);
    }

    #[test]
    fn all_zero_series_has_zero_turnover() {
        let b = run(&[0, 0, 0]);
        assert_eq!(b.turnover_proxy, 0.0);
        // Zero average degrades consistency to 0, so inverted consistency is a full 100.
        assert_eq!(b.score, 30.0);
    }

    #[test]
    fn score_stays_within_bounds() {
        for counts in [
            vec![0, 0, 1],
            vec![1, 0, 0],
            vec![100, 1, 100, 1],
            vec![1, 2, 400],
            vec![9, 9, 9],
        ] {
            let b = run(&counts);
            assert!((0.0..=100.0).contains(&b.score), "{counts:?} -> {}", b.score);
        }
    }

    #[test]
    fn repeated_scoring_is_bit_identical() {
        let counts = [3, 8, 2, 9, 4, 11, 6];
        let a = run(&counts);
        let b = run(&counts);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.turnover_proxy.to_bits(), b.turnover_proxy.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn short_series_is_rejected() {
        let s = series(5, &[1, 2]);
        let summary = summarize(&s).unwrap();
        assert_eq!(
            score(&s, &summary),
            Err(EngineError::InsufficientData {
                product_id: 5,
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn mismatched_summary_is_rejected() {
        let a = series(1, &[1, 2, 3]);
        let b = series(2, &[1, 2, 3]);
        let summary = summarize(&b).unwrap();
        assert!(matches!(score(&a, &summary), Err(EngineError::InvalidInput(_))));
    }
}
