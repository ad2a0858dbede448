//! rl-risk: deterministic activity risk scores for Riskline
//!
//! The rule-based model turns each activity's feature vector into seven
//! component scores, normalizes them across the project and combines them
//! with fixed weights. An optional external predictor can be blended in;
//! every score records which path produced it.

pub mod error;
pub mod factors;
pub mod pipeline;
pub mod predictor;
pub mod scoring;

pub use error::{PredictorError, PredictorResult};
pub use factors::{RiskFactors, RiskLevel};
pub use pipeline::{ActivityRisk, ProjectRisks};
pub use predictor::{
    model_feature, resolve_prediction, HybridRiskModel, LinearRiskPredictor, PredictionMethod,
    RiskPredictor, MODEL_FEATURES,
};
pub use scoring::{PopulationBounds, RiskComponents, RuleBasedRiskModel, WEIGHTS};
