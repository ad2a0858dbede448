//! What-if analysis for a single activity.
//!
//! Candidate actions (crashing, extra staff, risk treatment) are applied to
//! a copy of the project and re-forecast. The options are then ranked by a
//! utility that rewards P80/P50 gains and charges for cost and staff time.
//! Baseline and candidate forecasts share one seed, so differences come
//! from the change and not from sampling noise.

use crate::error::{FcResult, ForecastError};
use crate::monte_carlo::{ForecastResult, MonteCarloForecaster};
use crate::sampling::MIN_DRAW_DAYS;
use rand::Rng;
use rl_core::{Activity, ActivityId, DigitalTwin, EngineConfig, ForecastConfig};
use serde::{Deserialize, Serialize};

/// Share of added staff capacity that turns into shorter duration.
const FTE_EFFICIENCY: f64 = 0.7;

/// Risk reduction applied by a plain "reduce risk" request.
pub const DEFAULT_RISK_REDUCTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationKind {
    ReduceDuration,
    AddFte,
    ReduceRisk,
}

/// Edits applied to one activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityChange {
    /// New planned and baseline duration
    pub new_duration: Option<f64>,
    /// Fraction removed from risk probability and impact
    pub risk_reduction: Option<f64>,
    pub new_fte: Option<f64>,
    pub new_cost: Option<f64>,
}

impl ActivityChange {
    pub fn is_empty(&self) -> bool {
        self.new_duration.is_none()
            && self.risk_reduction.is_none()
            && self.new_fte.is_none()
            && self.new_cost.is_none()
    }

    /// Apply the edits in place.
    ///
    /// A remaining duration is rescaled with the planned one so the
    /// simulation, which prefers remaining work, sees the change.
    pub fn apply(&self, activity: &mut Activity) {
        if let Some(duration) = self.new_duration {
            let previous = activity.planned_or_baseline_duration();
            if let Some(remaining) = activity.remaining_duration.filter(|r| *r > 0.0) {
                activity.remaining_duration = Some(remaining * duration / previous);
            }
            activity.planned_duration = Some(duration);
            activity.baseline_duration = Some(duration);
        }
        if let Some(fraction) = self.risk_reduction {
            let keep = 1.0 - fraction.clamp(0.0, 1.0);
            activity.risk_probability *= keep;
            activity.risk_delay_impact_days *= keep;
        }
        if let Some(fte) = self.new_fte {
            activity.fte_allocation = fte.max(0.0);
        }
        if let Some(cost) = self.new_cost {
            activity.planned_cost = Some(cost);
        }
    }
}

/// One candidate action with its estimated cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationAction {
    pub kind: MitigationKind,
    pub description: String,
    pub change: ActivityChange,
    pub estimated_cost_multiplier: f64,
    pub estimated_fte_days: f64,
}

/// Candidate actions for an activity.
pub fn candidate_actions(activity: &Activity) -> Vec<MitigationAction> {
    let duration = activity.planned_or_baseline_duration();
    let fte = activity.fte_allocation;
    let mut actions = Vec::new();

    for pct in [10u32, 20, 30] {
        let share = f64::from(pct) / 100.0;
        actions.push(MitigationAction {
            kind: MitigationKind::ReduceDuration,
            description: format!("Reduce duration by {}% (crashing)", pct),
            change: ActivityChange {
                new_duration: Some(duration * (1.0 - share)),
                ..ActivityChange::default()
            },
            estimated_cost_multiplier: 1.0 + share * 0.5,
            estimated_fte_days: 0.0,
        });
    }

    if fte > 0.0 {
        for extra in [0.5, 1.0, 1.5] {
            let reduction = duration * (extra / (fte + extra)) * FTE_EFFICIENCY;
            actions.push(MitigationAction {
                kind: MitigationKind::AddFte,
                description: format!("Add {:.1} FTE for {:.1} days", extra, duration),
                change: ActivityChange {
                    new_duration: Some((duration - reduction).max(MIN_DRAW_DAYS)),
                    new_fte: Some(fte + extra),
                    ..ActivityChange::default()
                },
                estimated_cost_multiplier: 1.0 + extra / fte,
                estimated_fte_days: extra * duration,
            });
        }
    }

    if activity.risk_probability > 0.1 {
        for pct in [25u32, 50, 75] {
            let share = f64::from(pct) / 100.0;
            actions.push(MitigationAction {
                kind: MitigationKind::ReduceRisk,
                description: format!("Reduce risk probability and impact by {}%", pct),
                change: ActivityChange {
                    risk_reduction: Some(share),
                    ..ActivityChange::default()
                },
                estimated_cost_multiplier: 1.0 + share * 0.3,
                estimated_fte_days: 0.0,
            });
        }
    }

    actions
}

/// A candidate action with its forecast impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMitigation {
    pub action: MitigationAction,
    pub p50_new: i64,
    pub p80_new: i64,
    pub p50_improvement: f64,
    pub p80_improvement: f64,
    pub utility_score: f64,
}

/// Utility of an action: schedule gain minus cost and staffing penalties.
pub fn utility_score(p50_improvement: f64, p80_improvement: f64, action: &MitigationAction) -> f64 {
    let improvement = p80_improvement * 0.7 + p50_improvement * 0.3;
    let cost_penalty = (action.estimated_cost_multiplier - 1.0) * 10.0;
    let fte_penalty = action.estimated_fte_days * 0.1;
    improvement - cost_penalty - fte_penalty
}

/// Ranked options for one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationPlan {
    pub activity_id: ActivityId,
    pub baseline_forecast: ForecastResult,
    pub ranked_mitigations: Vec<RankedMitigation>,
    pub total_options: usize,
}

/// Generate, forecast and rank candidate actions for `activity_id`.
pub fn rank_mitigations(
    activities: &[Activity],
    activity_id: &str,
    config: &EngineConfig,
) -> FcResult<MitigationPlan> {
    let position = locate(activities, activity_id)?;
    let forecast_config = pinned_config(&config.forecast);

    let baseline = run_forecast(
        activities,
        &forecast_config,
        config.mitigation.baseline_simulations,
    );

    let mut ranked: Vec<RankedMitigation> = candidate_actions(&activities[position])
        .into_iter()
        .map(|action| {
            let modified = with_change(activities, position, &action.change);
            let mitigated = run_forecast(
                &modified,
                &forecast_config,
                config.mitigation.candidate_simulations,
            );
            let p50_improvement = round1((baseline.p50 - mitigated.p50) as f64);
            let p80_improvement = round1((baseline.p80 - mitigated.p80) as f64);
            RankedMitigation {
                utility_score: utility_score(p50_improvement, p80_improvement, &action),
                action,
                p50_new: mitigated.p50,
                p80_new: mitigated.p80,
                p50_improvement,
                p80_improvement,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.utility_score.total_cmp(&a.utility_score));

    log::debug!(
        "Ranked {} mitigation options for activity '{}'",
        ranked.len(),
        activity_id
    );

    Ok(MitigationPlan {
        activity_id: activities[position].id.clone(),
        baseline_forecast: baseline,
        total_options: ranked.len(),
        ranked_mitigations: ranked,
    })
}

/// Forecast gain of a single change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub p50_improvement: i64,
    pub p80_improvement: i64,
    pub p50_improvement_pct: f64,
    pub p80_improvement_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationComparison {
    pub activity_id: ActivityId,
    pub original_forecast: ForecastResult,
    pub new_forecast: ForecastResult,
    pub improvement: Improvement,
    pub mitigation_applied: ActivityChange,
}

/// Compare the project with and without `change` applied to `activity_id`.
pub fn simulate_mitigation(
    activities: &[Activity],
    activity_id: &str,
    change: &ActivityChange,
    config: &EngineConfig,
) -> FcResult<MitigationComparison> {
    let position = locate(activities, activity_id)?;
    let forecast_config = pinned_config(&config.forecast);
    let runs = config.mitigation.baseline_simulations;

    let original = run_forecast(activities, &forecast_config, runs);
    let modified = with_change(activities, position, change);
    let mitigated = run_forecast(&modified, &forecast_config, runs);

    let p50_improvement = original.p50 - mitigated.p50;
    let p80_improvement = original.p80 - mitigated.p80;

    Ok(MitigationComparison {
        activity_id: activities[position].id.clone(),
        improvement: Improvement {
            p50_improvement,
            p80_improvement,
            p50_improvement_pct: pct_of(p50_improvement, original.p50),
            p80_improvement_pct: pct_of(p80_improvement, original.p80),
        },
        original_forecast: original,
        new_forecast: mitigated,
        mitigation_applied: change.clone(),
    })
}

fn locate(activities: &[Activity], activity_id: &str) -> FcResult<usize> {
    activities
        .iter()
        .position(|a| a.id == activity_id)
        .ok_or_else(|| ForecastError::ActivityNotFound {
            id: activity_id.to_string(),
        })
}

/// Fix the seed so every forecast of one analysis shares random numbers.
fn pinned_config(config: &ForecastConfig) -> ForecastConfig {
    ForecastConfig {
        seed: Some(config.seed.unwrap_or_else(|| rand::thread_rng().gen())),
        ..config.clone()
    }
}

fn run_forecast(activities: &[Activity], config: &ForecastConfig, runs: usize) -> ForecastResult {
    let twin = DigitalTwin::build(activities);
    MonteCarloForecaster::new(&twin, config)
        .with_simulations(runs)
        .forecast(None)
}

fn with_change(activities: &[Activity], position: usize, change: &ActivityChange) -> Vec<Activity> {
    let mut modified = activities.to_vec();
    change.apply(&mut modified[position]);
    modified
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn pct_of(improvement: i64, baseline: i64) -> f64 {
    if baseline > 0 {
        improvement as f64 / baseline as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "mitigation_test.rs"]
mod tests;
