use serde::{Deserialize, Serialize};

/// Suggested stocking move, picked from the first matching rule in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    IncreaseStock,
    MaintainLevels,
    ReduceInventory,
    Baseline,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::IncreaseStock => "High investment value - consider increasing stock",
            Action::MaintainLevels => "Good restocking candidate - maintain current levels",
            Action::ReduceInventory => "Monitor closely - consider reducing inventory",
            Action::Baseline => "Standard restocking - maintain baseline levels",
        }
    }
}

pub fn action_for(growth_rate: f64, inverted_consistency: f64, turnover_proxy: f64) -> Action {
    if growth_rate > 5.0 && inverted_consistency > 60.0 {
        Action::IncreaseStock
    } else if growth_rate > 0.0 && turnover_proxy > 50.0 {
        Action::MaintainLevels
    } else if growth_rate < -5.0 {
        Action::ReduceInventory
    } else {
        Action::Baseline
    }
}

pub fn growth_phrase(growth_rate: f64) -> String {
    if growth_rate > 10.0 {
        format!("Strong demand growth ({growth_rate:.1}% increase)")
    } else if growth_rate > 0.0 {
        format!("Moderate demand growth ({growth_rate:.1}% increase)")
    } else if growth_rate < -10.0 {
        format!("Declining demand ({:.1}% decrease)", growth_rate.abs())
    } else {
        "Stable demand".to_string()
    }
}

pub fn consistency_phrase(inverted_consistency: f64) -> &'static str {
    if inverted_consistency > 80.0 {
        "highly consistent sales"
    } else if inverted_consistency > 60.0 {
        "moderately consistent sales"
    } else {
        "variable sales patterns"
    }
}

pub fn turnover_phrase(turnover_proxy: f64) -> &'static str {
    if turnover_proxy > 70.0 {
        "high stock turnover"
    } else if turnover_proxy > 40.0 {
        "moderate stock turnover"
    } else {
        "low stock turnover"
    }
}

/// One-sentence summary: the three metric bands followed by the action label.
///
/// Average demand does not affect the wording.
pub fn explain(
    product_name: &str,
    growth_rate: f64,
    inverted_consistency: f64,
    turnover_proxy: f64,
    _average_demand: f64,
) -> String {
    format!(
        "{product_name} shows {}, {}, {}. {}.",
        growth_phrase(growth_rate),
        consistency_phrase(inverted_consistency),
        turnover_phrase(turnover_proxy),
        action_for(growth_rate, inverted_consistency, turnover_proxy).label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_bands_follow_thresholds() {
        assert_eq!(growth_phrase(12.34), "Strong demand growth (12.3% increase)");
        assert_eq!(growth_phrase(10.0), "Moderate demand growth (10.0% increase)");
        assert_eq!(growth_phrase(0.5), "Moderate demand growth (0.5% increase)");
        assert_eq!(growth_phrase(0.0), "Stable demand");
        assert_eq!(growth_phrase(-10.0), "Stable demand");
        assert_eq!(growth_phrase(-14.0), "Declining demand (14.0% decrease)");
    }

    #[test]
    fn consistency_and_turnover_bands() {
        assert_eq!(consistency_phrase(80.01), "highly consistent sales");
        assert_eq!(consistency_phrase(80.0), "moderately consistent sales");
        assert_eq!(consistency_phrase(60.0), "variable sales patterns");

        assert_eq!(turnover_phrase(70.5), "high stock turnover");
        assert_eq!(turnover_phrase(70.0), "moderate stock turnover");
        assert_eq!(turnover_phrase(40.0), "low stock turnover");
    }

    #[test]
    fn action_rules_apply_in_priority_order() {
        // Both the first and second rules hold; the first wins.
        assert_eq!(action_for(6.0, 61.0, 90.0), Action::IncreaseStock);
        // Growth too weak for rule one but positive with high turnover.
        assert_eq!(action_for(3.0, 90.0, 51.0), Action::MaintainLevels);
        // Strong growth but variable demand and low turnover falls through to baseline.
        assert_eq!(action_for(20.0, 40.0, 30.0), Action::Baseline);
        assert_eq!(action_for(-5.1, 90.0, 90.0), Action::ReduceInventory);
        assert_eq!(action_for(-5.0, 90.0, 90.0), Action::Baseline);
    }

    #[test]
    fn builds_full_sentence() {
        let text = explain("Cola", 50.0, 59.18, 66.67, 10.0);
        assert_eq!(
            text,
            "Cola shows Strong demand growth (50.0% increase), variable sales patterns, \
             moderate stock turnover. Good restocking candidate - maintain current levels."
        );

        let flat = explain("Water", 0.0, 100.0, 100.0, 10.0);
        assert_eq!(
            flat,
            "Water shows Stable demand, highly consistent sales, high stock turnover. \
             Standard restocking - maintain baseline levels."
        );
    }

    #[test]
    fn same_metrics_give_same_sentence() {
        let a = explain("Chips", 12.5, 41.3, 55.0, 7.2);
        let b = explain("Chips", 12.5, 41.3, 55.0, 7.2);
        assert_eq!(a, b);
    }
}
