//! Optional learned predictor and its blending with the rule score.
//!
//! Any model plugs in through [`RiskPredictor`]. [`HybridRiskModel`] asks it
//! for a score, blends that with the rule score by `ml_weight`, and records
//! which path produced the final number. A failing predictor degrades to the
//! rule score unless fallback is disabled.

use crate::error::{PredictorError, PredictorResult};
use rl_analysis::ActivityFeatures;
use rl_core::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Contract for an external risk predictor returning a 0–100 score.
pub trait RiskPredictor: Send + Sync {
    fn predict(&self, features: &ActivityFeatures) -> PredictorResult<f64>;
}

/// Which path produced a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    Rule,
    Ml,
    Ensemble,
    MlFallback,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::Rule => "rule",
            PredictionMethod::Ml => "ml",
            PredictionMethod::Ensemble => "ensemble",
            PredictionMethod::MlFallback => "ml_fallback",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine a rule score with the outcome of a predictor call.
///
/// `ml` is `None` when no prediction was attempted. A successful prediction
/// is clamped to 0–100 and blended by `ml_weight` (1 ⇒ pure ML, 0 ⇒ pure
/// rule). A failure yields the rule score as `ml_fallback`, or the error
/// when `fallback_to_rule` is off.
pub fn resolve_prediction(
    rule_score: f64,
    ml: Option<PredictorResult<f64>>,
    ml_weight: f64,
    fallback_to_rule: bool,
) -> PredictorResult<(f64, PredictionMethod)> {
    match ml {
        None => Ok((rule_score, PredictionMethod::Rule)),
        Some(Ok(ml_score)) => {
            let ml_score = ml_score.clamp(0.0, 100.0);
            if ml_weight >= 1.0 {
                Ok((ml_score, PredictionMethod::Ml))
            } else if ml_weight <= 0.0 {
                Ok((rule_score, PredictionMethod::Rule))
            } else {
                let blended = ml_weight * ml_score + (1.0 - ml_weight) * rule_score;
                Ok((blended, PredictionMethod::Ensemble))
            }
        }
        Some(Err(e)) if fallback_to_rule => {
            log::warn!("Risk predictor failed, using rule score: {}", e);
            Ok((rule_score, PredictionMethod::MlFallback))
        }
        Some(Err(e)) => Err(e),
    }
}

/// Rule scores optionally blended with a predictor.
pub struct HybridRiskModel<'a> {
    predictor: Option<&'a dyn RiskPredictor>,
    use_ml: bool,
    ml_weight: f64,
    fallback_to_rule: bool,
}

impl<'a> HybridRiskModel<'a> {
    pub fn new(predictor: Option<&'a dyn RiskPredictor>, config: &ScoringConfig) -> Self {
        Self {
            predictor,
            use_ml: config.use_ml,
            ml_weight: config.ml_weight,
            fallback_to_rule: config.fallback_to_rule,
        }
    }

    /// Whether a predictor will be consulted.
    pub fn is_ml_available(&self) -> bool {
        self.use_ml && self.predictor.is_some()
    }

    /// Final score for an activity whose rule score is already known.
    pub fn predict(
        &self,
        features: &ActivityFeatures,
        rule_score: f64,
    ) -> PredictorResult<(f64, PredictionMethod)> {
        let ml = match self.predictor {
            Some(predictor) if self.use_ml => Some(predictor.predict(features).and_then(|s| {
                if s.is_finite() {
                    Ok(s)
                } else {
                    Err(PredictorError::NonFiniteScore {
                        activity_id: features.activity_id.to_string(),
                    })
                }
            })),
            _ => None,
        };
        resolve_prediction(rule_score, ml, self.ml_weight, self.fallback_to_rule)
    }
}

/// Features a [`LinearRiskPredictor`] may weight.
pub const MODEL_FEATURES: &[&str] = &[
    "delay_baseline_days",
    "float_days",
    "progress_slip",
    "expected_delay_days",
    "is_on_critical_path",
    "predecessor_count",
    "successor_count",
    "downstream_critical_depth",
    "in_degree",
    "out_degree",
    "fte_ratio",
    "resource_overbooked",
    "percent_complete",
    "risk_probability",
    "risk_delay_impact_days",
    "cost_impact_of_risk",
];

/// Numeric value of a named model feature; booleans map to 0/1.
pub fn model_feature(features: &ActivityFeatures, name: &str) -> Option<f64> {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let value = match name {
        "delay_baseline_days" => features.delay_baseline_days,
        "float_days" => features.float_days,
        "progress_slip" => features.progress_slip,
        "expected_delay_days" => features.expected_delay_days,
        "is_on_critical_path" => flag(features.is_on_critical_path),
        "predecessor_count" => features.predecessor_count as f64,
        "successor_count" => features.successor_count as f64,
        "downstream_critical_depth" => features.downstream_critical_depth as f64,
        "in_degree" => features.in_degree as f64,
        "out_degree" => features.out_degree as f64,
        "fte_ratio" => features.fte_ratio,
        "resource_overbooked" => flag(features.resource_overbooked),
        "percent_complete" => features.percent_complete,
        "risk_probability" => features.risk_probability,
        "risk_delay_impact_days" => features.risk_delay_impact_days,
        "cost_impact_of_risk" => features.cost_impact_of_risk,
        _ => return None,
    };
    Some(value)
}

/// Linear model exported by an offline training job.
///
/// ```json
/// { "intercept": 5.0, "weights": { "delay_baseline_days": 1.5, "fte_ratio": 20.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearRiskPredictor {
    #[serde(default)]
    pub intercept: f64,
    pub weights: BTreeMap<String, f64>,
}

impl LinearRiskPredictor {
    /// Build a model, rejecting unknown feature names.
    pub fn new(intercept: f64, weights: BTreeMap<String, f64>) -> PredictorResult<Self> {
        if let Some(name) = weights.keys().find(|k| !MODEL_FEATURES.contains(&k.as_str())) {
            return Err(PredictorError::UnknownFeature { name: name.clone() });
        }
        Ok(Self { intercept, weights })
    }

    /// Load a model from a JSON file.
    pub fn load(path: &Path) -> PredictorResult<Self> {
        let load_err = |message: String| PredictorError::ModelLoad {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let parsed: LinearRiskPredictor =
            serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))?;
        let model = Self::new(parsed.intercept, parsed.weights)?;
        log::debug!(
            "Loaded linear risk model with {} weights from {}",
            model.weights.len(),
            path.display()
        );
        Ok(model)
    }
}

impl RiskPredictor for LinearRiskPredictor {
    fn predict(&self, features: &ActivityFeatures) -> PredictorResult<f64> {
        self.weights
            .iter()
            .try_fold(self.intercept, |acc, (name, weight)| {
                model_feature(features, name)
                    .map(|value| acc + weight * value)
                    .ok_or_else(|| PredictorError::UnknownFeature { name: name.clone() })
            })
            .map(|score| score.clamp(0.0, 100.0))
    }
}

#[cfg(test)]
#[path = "predictor_test.rs"]
mod tests;
