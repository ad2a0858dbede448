//! Rule-based activity risk score.
//!
//! Seven components, each on a 0–100 scale, are min-max normalized across
//! the project's population and combined with fixed weights. The score
//! describes current state only; it never reads simulation output.

use crate::factors::RiskFactors;
use rl_analysis::ActivityFeatures;
use serde::{Deserialize, Serialize};

/// Number of score components.
pub const COMPONENT_COUNT: usize = 7;

/// Component weights in [`RiskComponents::as_array`] order. They sum to 1.
pub const WEIGHTS: [f64; COMPONENT_COUNT] = [0.25, 0.25, 0.10, 0.20, 0.10, 0.05, 0.05];

/// Delay (days) that maps to a full schedule-delay score.
const DELAY_SCALE_DAYS: f64 = 30.0;

/// Map `value` from `[min, max]` onto 0–100, clamped. Equal bounds give 0.
pub fn normalize_to_0_100(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

pub fn schedule_delay_score(f: &ActivityFeatures) -> f64 {
    normalize_to_0_100(f.delay_baseline_days, 0.0, DELAY_SCALE_DAYS)
}

pub fn progress_slip_score(f: &ActivityFeatures) -> f64 {
    f.progress_slip * 100.0
}

pub fn risk_register_score(f: &ActivityFeatures) -> f64 {
    let probability = f.risk_probability * 50.0;
    let impact = normalize_to_0_100(f.risk_delay_impact_days, 0.0, DELAY_SCALE_DAYS) * 0.5;
    let expected = (f.expected_delay_days * 2.0).min(20.0);
    (probability + impact + expected).min(100.0)
}

/// Float score on 0–100 plus a flat bonus for activities on the
/// authoritative critical path, larger the lower their float.
pub fn float_criticality_score(f: &ActivityFeatures) -> f64 {
    let base = f.float_score * 100.0;
    if !f.is_on_critical_path {
        return base;
    }
    let bonus = if f.float_score >= 0.8 {
        40.0
    } else if f.float_score >= 0.6 {
        35.0
    } else if f.float_score >= 0.4 {
        30.0
    } else {
        25.0
    };
    (base + bonus).min(100.0)
}

pub fn dependency_score(f: &ActivityFeatures) -> f64 {
    let mut score = 0.0;
    if f.predecessor_count >= 5 {
        score += 30.0;
    } else if f.predecessor_count >= 3 {
        score += 15.0;
    }
    if f.successor_count >= 5 {
        score += 40.0;
    } else if f.successor_count >= 3 {
        score += 25.0;
    }
    if f.downstream_critical_depth >= 3 {
        score += 30.0;
    } else if f.downstream_critical_depth >= 1 {
        score += 15.0;
    }
    f64::min(score, 100.0)
}

/// Piecewise on allocation / capacity: gentle below 70%, steep near and
/// above full capacity.
pub fn resource_overload_score(f: &ActivityFeatures) -> f64 {
    let r = f.fte_ratio;
    let score = if r > 1.0 {
        (r - 1.0) * 100.0
    } else if r > 0.9 {
        60.0 + (r - 0.9) / 0.1 * 40.0
    } else if r > 0.7 {
        30.0 + (r - 0.7) / 0.2 * 30.0
    } else if r > 0.0 {
        r * 30.0 / 0.7
    } else {
        0.0
    };
    score.clamp(0.0, 100.0)
}

pub fn anomaly_score(f: &ActivityFeatures) -> f64 {
    if f.zombie_task || f.resource_black_hole {
        100.0
    } else {
        0.0
    }
}

/// Raw or normalized component scores of one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub schedule_delay: f64,
    pub progress_slip: f64,
    pub risk_register: f64,
    pub float_criticality: f64,
    pub dependency: f64,
    pub resource_overload: f64,
    pub anomaly: f64,
}

impl RiskComponents {
    pub fn compute(f: &ActivityFeatures) -> Self {
        Self {
            schedule_delay: schedule_delay_score(f),
            progress_slip: progress_slip_score(f),
            risk_register: risk_register_score(f),
            float_criticality: float_criticality_score(f),
            dependency: dependency_score(f),
            resource_overload: resource_overload_score(f),
            anomaly: anomaly_score(f),
        }
    }

    pub fn as_array(&self) -> [f64; COMPONENT_COUNT] {
        [
            self.schedule_delay,
            self.progress_slip,
            self.risk_register,
            self.float_criticality,
            self.dependency,
            self.resource_overload,
            self.anomaly,
        ]
    }

    fn from_array(values: [f64; COMPONENT_COUNT]) -> Self {
        Self {
            schedule_delay: values[0],
            progress_slip: values[1],
            risk_register: values[2],
            float_criticality: values[3],
            dependency: values[4],
            resource_overload: values[5],
            anomaly: values[6],
        }
    }

    /// `100 * Σ w·c/100`, clamped to 0–100.
    pub fn weighted_score(&self) -> f64 {
        let sum: f64 = WEIGHTS
            .iter()
            .zip(self.as_array())
            .map(|(w, c)| w * (c / 100.0))
            .sum();
        (sum * 100.0).clamp(0.0, 100.0)
    }
}

/// Per-component minimum and maximum over a project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationBounds {
    min: [f64; COMPONENT_COUNT],
    max: [f64; COMPONENT_COUNT],
}

impl PopulationBounds {
    pub fn from_components(components: &[RiskComponents]) -> Self {
        let mut min = [f64::INFINITY; COMPONENT_COUNT];
        let mut max = [f64::NEG_INFINITY; COMPONENT_COUNT];
        for c in components {
            for (i, value) in c.as_array().into_iter().enumerate() {
                min[i] = min[i].min(value);
                max[i] = max[i].max(value);
            }
        }
        Self { min, max }
    }

    /// Min-max normalize each component onto 0–100.
    pub fn normalize(&self, components: &RiskComponents) -> RiskComponents {
        let mut values = components.as_array();
        for (i, value) in values.iter_mut().enumerate() {
            let (lo, hi) = (self.min[i], self.max[i]);
            *value = if hi == lo || !hi.is_finite() || !lo.is_finite() {
                0.0
            } else {
                (*value - lo) / (hi - lo) * 100.0
            };
        }
        RiskComponents::from_array(values)
    }
}

/// Deterministic weighted-sum scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleBasedRiskModel;

impl RuleBasedRiskModel {
    pub fn new() -> Self {
        Self
    }

    /// Score one activity against its project.
    ///
    /// With more than one activity in `population` each component is
    /// normalized across it; otherwise raw components are used. Prefer
    /// [`score_population`](Self::score_population) for whole projects.
    pub fn score(&self, features: &ActivityFeatures, population: &[ActivityFeatures]) -> f64 {
        let components = RiskComponents::compute(features);
        if population.len() > 1 {
            let all: Vec<RiskComponents> = population.iter().map(RiskComponents::compute).collect();
            PopulationBounds::from_components(&all)
                .normalize(&components)
                .weighted_score()
        } else {
            components.weighted_score()
        }
    }

    /// Score every activity of a project, normalizing once.
    pub fn score_population(&self, population: &[ActivityFeatures]) -> Vec<f64> {
        let all: Vec<RiskComponents> = population.iter().map(RiskComponents::compute).collect();
        if all.len() > 1 {
            let bounds = PopulationBounds::from_components(&all);
            all.iter()
                .map(|c| bounds.normalize(c).weighted_score())
                .collect()
        } else {
            all.iter().map(RiskComponents::weighted_score).collect()
        }
    }

    /// Human-readable low/medium/high factors.
    pub fn risk_factors(&self, features: &ActivityFeatures) -> RiskFactors {
        RiskFactors::from_features(features)
    }
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
