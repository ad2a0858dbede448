//! Low/medium/high risk factors for presentation.

use crate::predictor::PredictionMethod;
use crate::scoring::{resource_overload_score, schedule_delay_score};
use rl_analysis::ActivityFeatures;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Level of a 0–100 risk score: 70 and above is high, 40 and above medium.
    /// Component scores use the same thresholds.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factor breakdown attached to each scored activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub delay: RiskLevel,
    pub critical_path: RiskLevel,
    pub resource: RiskLevel,
    pub prediction_method: PredictionMethod,
}

impl RiskFactors {
    /// Factors for one activity, with `prediction_method` set to `rule`.
    ///
    /// Delay thresholds tighten on the authoritative critical path: with at
    /// most two days of float any delay is at least medium.
    pub fn from_features(f: &ActivityFeatures) -> Self {
        let delay_days = f.delay_baseline_days;
        let delay = match (f.is_on_critical_path, f.float_days <= 2.0) {
            (true, true) => {
                if delay_days >= 7.0 {
                    RiskLevel::High
                } else if delay_days > 0.0 {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
            (true, false) => {
                if delay_days >= 10.0 {
                    RiskLevel::High
                } else if delay_days >= 5.0 {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                }
            }
            (false, _) => RiskLevel::from_score(schedule_delay_score(f)),
        };

        let critical_path = if !f.is_on_critical_path {
            RiskLevel::Low
        } else if f.float_days <= 2.0 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };

        Self {
            delay,
            critical_path,
            resource: RiskLevel::from_score(resource_overload_score(f)),
            prediction_method: PredictionMethod::Rule,
        }
    }

    pub fn with_method(mut self, method: PredictionMethod) -> Self {
        self.prediction_method = method;
        self
    }
}
