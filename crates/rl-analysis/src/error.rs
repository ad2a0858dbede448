//! Error types for rl-analysis

use thiserror::Error;

/// Analysis error type
///
/// These use the `AE` prefix (Analysis Error). Public extractors absorb them
/// into warnings and safe defaults; they surface only from the lower-level
/// fitting routines.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// AE001: A clustering input carried NaN or infinite values
    #[error("[AE001] Non-finite clustering input for activity '{activity_id}'")]
    NonFiniteInput { activity_id: String },

    /// AE002: k-means did not produce a usable partition
    #[error("[AE002] Clustering failed: {message}")]
    ClusteringFailed { message: String },

    /// AE003: Core error propagation
    #[error("[AE003] Core error: {0}")]
    Core(#[from] rl_core::CoreError),
}

/// Result type alias for AnalysisError
pub type AnalysisResult<T> = Result<T, AnalysisError>;
