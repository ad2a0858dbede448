//! Error types for rl-risk

use thiserror::Error;

/// Predictor error type
///
/// These use the `PE` prefix (Predictor Error). With fallback enabled the
/// scorer absorbs them and records `ml_fallback`; they surface only when
/// fallback is switched off or a model file cannot be loaded.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// PE001: The predictor could not produce a score
    #[error("[PE001] Prediction failed: {message}")]
    PredictionFailed { message: String },

    /// PE002: The predictor returned NaN or an infinite score
    #[error("[PE002] Predictor returned a non-finite score for activity '{activity_id}'")]
    NonFiniteScore { activity_id: String },

    /// PE003: A model file names a feature the predictor does not know
    #[error("[PE003] Unknown model feature '{name}'")]
    UnknownFeature { name: String },

    /// PE004: Model file could not be read or decoded
    #[error("[PE004] Failed to load model '{path}': {message}")]
    ModelLoad { path: String, message: String },
}

/// Result type alias for PredictorError
pub type PredictorResult<T> = Result<T, PredictorError>;
