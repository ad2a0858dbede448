//! Forensic forecast pipeline.
//!
//! twin → skill → topology → features → clusters → archetypes → modulator
//! → Monte Carlo, plus a short summary of what the forensic layers found.

use crate::monte_carlo::{ForecastResult, MonteCarloForecaster};
use chrono::NaiveDate;
use rl_analysis::{ProjectAnalysis, SimulationParameters};
use rl_core::{Activity, ActivityId, DigitalTwin, EngineConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Drift ratio above which an activity counts as drifting.
pub const DRIFT_INSIGHT_THRESHOLD: f64 = 0.1;

/// Betweenness above which an activity counts as a bridge node.
pub const BRIDGE_BETWEENNESS_THRESHOLD: f64 = 0.5;

/// Lowest cluster id treated as high risk.
pub const HIGH_RISK_CLUSTER: usize = 2;

/// Counts of forensic findings attached to a forecast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicInsights {
    pub drift_activities: usize,
    pub skill_bottlenecks: usize,
    pub high_risk_clusters: usize,
    pub bridge_nodes: usize,
}

impl ForensicInsights {
    pub fn from_analysis(analysis: &ProjectAnalysis) -> Self {
        Self {
            drift_activities: analysis
                .features
                .features
                .iter()
                .filter(|f| f.drift.drift_ratio > DRIFT_INSIGHT_THRESHOLD)
                .count(),
            skill_bottlenecks: analysis.skill.skill_bottlenecks.len(),
            high_risk_clusters: analysis
                .clustering
                .assignments
                .values()
                .filter(|&&c| c >= HIGH_RISK_CLUSTER)
                .count(),
            bridge_nodes: analysis
                .topology
                .scores
                .values()
                .filter(|s| s.betweenness > BRIDGE_BETWEENNESS_THRESHOLD)
                .count(),
        }
    }
}

/// A forensic forecast with the analysis that shaped it.
#[derive(Debug, Clone)]
pub struct ForensicForecast {
    pub forecast: ForecastResult,
    pub analysis: ProjectAnalysis,
    pub parameters: BTreeMap<ActivityId, SimulationParameters>,
}

impl ForensicForecast {
    pub fn run(activities: &[Activity], config: &EngineConfig, reference_date: NaiveDate) -> Self {
        let analysis = ProjectAnalysis::compute(activities, config, reference_date);
        let parameters = analysis.simulation_parameters();

        let mut forecast = MonteCarloForecaster::new(&analysis.twin, &config.forecast)
            .with_max_listed_ids(config.warnings.max_listed_ids)
            .forecast(Some(&parameters));
        if let Some(warning) = &analysis.clustering.warning {
            forecast.warnings.push(warning.clone());
        }
        forecast.forensic_insights = Some(ForensicInsights::from_analysis(&analysis));

        Self {
            forecast,
            analysis,
            parameters,
        }
    }
}

/// Forecast without forensic modulation.
pub fn standard_forecast(activities: &[Activity], config: &EngineConfig) -> ForecastResult {
    let twin = DigitalTwin::build(activities);
    MonteCarloForecaster::new(&twin, &config.forecast)
        .with_max_listed_ids(config.warnings.max_listed_ids)
        .forecast(None)
}

/// Sum of baseline (else planned) durations of activities flagged on the
/// critical path; the yardstick explanations compare against.
pub fn baseline_critical_days(activities: &[Activity]) -> Option<i64> {
    let total: f64 = activities
        .iter()
        .filter(|a| a.on_critical_path)
        .map(|a| {
            a.baseline_duration
                .filter(|d| *d > 0.0)
                .or(a.planned_duration)
                .unwrap_or(0.0)
        })
        .sum();
    (total > 0.0).then(|| total.floor() as i64)
}
