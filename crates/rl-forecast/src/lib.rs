//! rl-forecast: Monte Carlo completion forecasts for Riskline
//!
//! Samples activity durations from triangular distributions, shaped either
//! by the risk register or by the forensic simulation parameters, runs one
//! critical path pass per simulation, and aggregates percentiles and
//! criticality indices. On top sit the forensic pipeline, mitigation
//! what-if analysis and plain-language explanations.

pub mod error;
pub mod explain;
pub mod mitigation;
pub mod monte_carlo;
pub mod pipeline;
pub mod sampling;

pub use error::{FcResult, ForecastError};
pub use explain::{
    ConfidenceInterval, ConfidenceSummary, Explainer, ForecastExplanation, UncertaintyLevel,
};
pub use mitigation::{
    candidate_actions, rank_mitigations, simulate_mitigation, utility_score, ActivityChange,
    Improvement, MitigationAction, MitigationComparison, MitigationKind, MitigationPlan,
    RankedMitigation, DEFAULT_RISK_REDUCTION,
};
pub use monte_carlo::{current_progress_pct, percentile, ForecastResult, MonteCarloForecaster};
pub use pipeline::{baseline_critical_days, standard_forecast, ForensicForecast, ForensicInsights};
pub use sampling::{DurationDraw, Triangular, MIN_DRAW_DAYS};
