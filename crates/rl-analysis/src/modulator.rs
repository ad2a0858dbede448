//! Uncertainty modulator: turns forensic signals into simulation shape.
//!
//! Combination rules are fixed: mode shifts add, variance multipliers
//! multiply, and failure probabilities take the maximum so a cost overrun
//! and a risky archetype do not double-penalize the same activity.

use crate::cluster::RiskArchetype;
use crate::features::ActivityFeatures;
use crate::skill::SkillAnalysis;
use crate::topology::TopologyScore;
use rl_core::Activity;
use serde::{Deserialize, Serialize};

/// Distribution shaping for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub base_duration: f64,
    pub mode_shift: f64,
    pub variance_multiplier: f64,
    pub failure_probability: f64,
}

impl SimulationParameters {
    /// Parameters that reproduce the unmodulated base duration.
    pub fn neutral(base_duration: f64) -> Self {
        Self {
            base_duration,
            mode_shift: 0.0,
            variance_multiplier: 1.0,
            failure_probability: 0.0,
        }
    }

    /// Most likely duration after the mode shift.
    pub fn mode(&self) -> f64 {
        self.base_duration * (1.0 + self.mode_shift)
    }
}

pub fn modulate(
    activity: &Activity,
    features: &ActivityFeatures,
    archetype: &RiskArchetype,
    topology: Option<&TopologyScore>,
    skill: &SkillAnalysis,
) -> SimulationParameters {
    let topology_variance = topology.map(|t| t.variance_multiplier).unwrap_or(1.0);
    let cost_risk = features
        .cost
        .map(|c| c.risk_event_probability)
        .unwrap_or(0.0);

    SimulationParameters {
        base_duration: activity.base_duration(),
        mode_shift: features.drift.mode_shift_factor + archetype.mode_shift_factor,
        variance_multiplier: skill.variance_for(activity.id.as_str())
            * topology_variance
            * archetype.variance_multiplier,
        failure_probability: archetype.failure_probability.max(cost_risk),
    }
}

#[cfg(test)]
#[path = "modulator_test.rs"]
mod tests;
