//! Drift velocity: how far the plan has already slipped from baseline.

use rl_core::Activity;
use serde::{Deserialize, Serialize};

/// Historical drift of one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftVelocity {
    /// `(planned - baseline) / baseline`
    pub drift_ratio: f64,

    /// Remaining duration stretched by the drift ratio
    pub drift_adjusted_remaining: f64,

    /// Mode shift handed to the simulation (equal to the drift ratio)
    pub mode_shift_factor: f64,
}

impl DriftVelocity {
    pub fn compute(activity: &Activity) -> Self {
        let baseline = activity.baseline_duration.unwrap_or(0.0);
        let planned = activity.planned_duration.unwrap_or(0.0);
        let remaining = activity.remaining_duration.unwrap_or(0.0);

        let drift_ratio = if baseline > 0.0 {
            (planned - baseline) / baseline
        } else {
            0.0
        };

        let drift_adjusted_remaining = if remaining > 0.0 {
            remaining * (1.0 + drift_ratio)
        } else {
            remaining
        };

        Self {
            drift_ratio,
            drift_adjusted_remaining,
            mode_shift_factor: drift_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_from_planned_over_baseline() {
        let mut a = Activity::new("A", "Task");
        a.baseline_duration = Some(10.0);
        a.planned_duration = Some(16.0);
        a.remaining_duration = Some(5.0);

        let drift = DriftVelocity::compute(&a);

        assert!((drift.drift_ratio - 0.6).abs() < 1e-12);
        assert!((drift.drift_adjusted_remaining - 8.0).abs() < 1e-12);
        assert_eq!(drift.mode_shift_factor, drift.drift_ratio);
    }

    #[test]
    fn test_missing_baseline_means_no_drift() {
        let mut a = Activity::new("A", "Task");
        a.planned_duration = Some(16.0);
        a.baseline_duration = Some(0.0);

        let drift = DriftVelocity::compute(&a);

        assert_eq!(drift.drift_ratio, 0.0);
        assert_eq!(drift.drift_adjusted_remaining, 0.0);
    }

    #[test]
    fn test_missing_planned_counts_as_zero() {
        let mut a = Activity::new("A", "Task");
        a.baseline_duration = Some(10.0);

        assert_eq!(DriftVelocity::compute(&a).drift_ratio, -1.0);
    }
}
