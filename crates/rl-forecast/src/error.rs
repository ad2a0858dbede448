//! Error types for rl-forecast

use thiserror::Error;

/// Forecast error type
///
/// These use the `FE` prefix (Forecast Error). Simulation itself never
/// fails; errors come from caller mistakes and template rendering.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// FE001: A what-if request named an activity that is not in the project
    #[error("[FE001] Activity not found: {id}")]
    ActivityNotFound { id: String },

    /// FE002: Explanation template failed to render
    #[error("[FE002] Explanation render error: {0}")]
    Render(String),

    /// FE003: Core error propagation
    #[error("[FE003] Core error: {0}")]
    Core(#[from] rl_core::CoreError),
}

/// Result type alias for ForecastError (`ForecastResult` names the forecast output)
pub type FcResult<T> = Result<T, ForecastError>;

impl From<minijinja::Error> for ForecastError {
    fn from(err: minijinja::Error) -> Self {
        ForecastError::Render(err.to_string())
    }
}
