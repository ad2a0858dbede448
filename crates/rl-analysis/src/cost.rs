//! Cost performance index (CPI) and the failure risk it implies.

use rl_core::Activity;
use serde::{Deserialize, Serialize};

/// CPI below which an activity starts to accrue risk-event probability.
const CPI_THRESHOLD: f64 = 0.9;

/// Cap on the risk-event probability attributed to cost overrun.
const MAX_COST_RISK: f64 = 0.3;

/// Cost efficiency of one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPerformance {
    /// Planned cost over actual cost to date; 1.0 with no spend recorded
    pub cpi_trend: f64,

    /// Actual minus planned
    pub cost_variance: f64,

    pub risk_event_probability: f64,
}

impl Default for CostPerformance {
    fn default() -> Self {
        Self {
            cpi_trend: 1.0,
            cost_variance: 0.0,
            risk_event_probability: 0.0,
        }
    }
}

impl CostPerformance {
    pub fn compute(activity: &Activity) -> Self {
        let planned = activity.planned_cost.unwrap_or(0.0);
        let actual = activity.actual_cost_to_date.unwrap_or(0.0);

        let cpi_trend = if actual > 0.0 { planned / actual } else { 1.0 };

        let risk_event_probability = if cpi_trend < CPI_THRESHOLD {
            ((CPI_THRESHOLD - cpi_trend) * 2.0).min(MAX_COST_RISK)
        } else {
            0.0
        };

        Self {
            cpi_trend,
            cost_variance: actual - planned,
            risk_event_probability,
        }
    }

    /// `None` when the activity carries no cost data at all.
    pub fn compute_optional(activity: &Activity) -> Option<Self> {
        if activity.planned_cost.is_none() && activity.actual_cost_to_date.is_none() {
            None
        } else {
            Some(Self::compute(activity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costed(planned: f64, actual: f64) -> Activity {
        let mut a = Activity::new("A", "Task");
        a.planned_cost = Some(planned);
        a.actual_cost_to_date = Some(actual);
        a
    }

    #[test]
    fn test_overrun_raises_risk_event_probability() {
        let cost = CostPerformance::compute(&costed(80.0, 100.0));

        assert!((cost.cpi_trend - 0.8).abs() < 1e-12);
        assert!((cost.risk_event_probability - 0.2).abs() < 1e-9);
        assert_eq!(cost.cost_variance, 20.0);
    }

    #[test]
    fn test_risk_event_probability_is_capped() {
        let cost = CostPerformance::compute(&costed(10.0, 100.0));
        assert_eq!(cost.risk_event_probability, 0.3);
    }

    #[test]
    fn test_no_spend_means_on_track() {
        let cost = CostPerformance::compute(&costed(100.0, 0.0));
        assert_eq!(cost.cpi_trend, 1.0);
        assert_eq!(cost.risk_event_probability, 0.0);
        assert_eq!(cost.cost_variance, -100.0);
    }

    #[test]
    fn test_compute_optional_without_cost_fields() {
        let a = Activity::new("A", "Task");
        assert!(CostPerformance::compute_optional(&a).is_none());
        assert!(CostPerformance::compute_optional(&costed(1.0, 1.0)).is_some());
    }
}
