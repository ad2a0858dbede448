//! Per-activity feature vector.
//!
//! [`FeatureSet::compute`] derives every schedule, graph, resource and
//! forensic signal for a project in one pass over its twin. Cluster and
//! archetype are left empty here; the pipelines fill them after clustering.

use crate::cluster::RiskArchetype;
use crate::cost::CostPerformance;
use crate::drift::DriftVelocity;
use crate::skill::SkillAnalysis;
use crate::topology::{TopologyMetrics, TopologyScore};
use chrono::NaiveDate;
use rl_core::{planned_durations, Activity, ActivityId, CriticalPathEngine, DigitalTwin};
use serde::{Deserialize, Serialize};

/// Float (days) at or beyond which an activity is considered safe.
pub const FLOAT_SAFE_DAYS: f64 = 5.0;

/// Percent complete under which a started-late task counts as a zombie.
pub const ZOMBIE_PROGRESS_PCT: f64 = 5.0;

/// Longest critical-successor chain that is still counted.
pub const MAX_CRITICAL_DEPTH: usize = 64;

/// All features of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFeatures {
    pub activity_id: ActivityId,
    pub delay_baseline_days: f64,
    pub float_days: f64,
    pub float_score: f64,
    pub progress_slip: f64,
    pub expected_delay_days: f64,
    pub is_on_critical_path: bool,
    /// Float is zero
    pub critical_path_flag: bool,
    pub predecessor_count: usize,
    pub successor_count: usize,
    pub in_degree: usize,
    pub out_degree: usize,
    pub downstream_critical_depth: usize,
    pub fte_ratio: f64,
    pub resource_overbooked: bool,
    pub zombie_task: bool,
    pub resource_black_hole: bool,
    pub percent_complete: f64,
    pub risk_probability: f64,
    pub risk_delay_impact_days: f64,
    pub cost_impact_of_risk: f64,
    pub drift: DriftVelocity,
    /// `None` when the activity carries no cost data
    pub cost: Option<CostPerformance>,
    pub is_skill_bottleneck: bool,
    pub skill_overload_pct: f64,
    pub skill_variance_multiplier: f64,
    pub betweenness: f64,
    pub eigenvector: f64,
    pub cluster_id: Option<usize>,
    pub archetype: Option<RiskArchetype>,
}

impl ActivityFeatures {
    /// Attach a cluster assignment.
    pub fn with_cluster(mut self, cluster_id: usize) -> Self {
        self.cluster_id = Some(cluster_id);
        self.archetype = Some(RiskArchetype::for_cluster(cluster_id));
        self
    }
}

/// `1` at or below zero float, `0` at or beyond five days, linear between.
pub fn float_score(float_days: f64) -> f64 {
    if float_days <= 0.0 {
        1.0
    } else if float_days < FLOAT_SAFE_DAYS {
        (1.0 - float_days / FLOAT_SAFE_DAYS).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Expected progress at `reference`, compared with actual progress.
///
/// Zero or negative planned windows yield no slip.
pub fn progress_slip(activity: &Activity, reference: NaiveDate) -> f64 {
    let (Some(start), Some(finish)) = (activity.planned_start, activity.planned_finish) else {
        return 0.0;
    };
    let window = (finish - start).num_days() as f64;
    if window <= 0.0 {
        return 0.0;
    }
    let elapsed = ((reference.min(finish) - start).num_days() as f64).max(0.0);
    let expected = (elapsed / window).clamp(0.0, 1.0);
    (expected - activity.percent_complete / 100.0).max(0.0)
}

/// Features for every activity of a twin, in activity order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub features: Vec<ActivityFeatures>,
}

impl FeatureSet {
    pub fn compute(
        twin: &DigitalTwin,
        reference_date: NaiveDate,
        skill: &SkillAnalysis,
        topology: &TopologyMetrics,
    ) -> Self {
        let activities = twin.activities();
        let cpm = CriticalPathEngine::new(twin).compute(&planned_durations(activities));
        let depths = critical_depths(twin);

        let features = activities
            .iter()
            .enumerate()
            .map(|(i, activity)| {
                let scheduled = activity.planned_start.is_some() && activity.planned_finish.is_some();
                let float_days = match activity.total_float {
                    Some(tf) => tf.max(0.0),
                    None if scheduled => cpm.timings[i].total_float,
                    None if activity.on_critical_path => 0.0,
                    None => activity.planned_duration.unwrap_or(0.0),
                };

                let delay_baseline_days = match (activity.planned_finish, activity.baseline_finish) {
                    (Some(planned), Some(baseline)) => {
                        ((planned - baseline).num_days() as f64).max(0.0)
                    }
                    _ => 0.0,
                };

                let fte_ratio = activity.fte_ratio();
                let overbooked = fte_ratio > 1.0;
                let zombie = activity
                    .planned_start
                    .is_some_and(|ps| ps <= reference_date)
                    && activity.percent_complete < ZOMBIE_PROGRESS_PCT;

                let id = activity.id.as_str();
                let centrality = topology.get(id).copied().unwrap_or(TopologyScore::new(0.0, 0.0));

                ActivityFeatures {
                    activity_id: activity.id.clone(),
                    delay_baseline_days,
                    float_days,
                    float_score: float_score(float_days),
                    progress_slip: progress_slip(activity, reference_date),
                    expected_delay_days: activity.expected_delay_days(),
                    is_on_critical_path: activity.on_critical_path,
                    critical_path_flag: float_days <= 0.0,
                    predecessor_count: activity.predecessors.len(),
                    successor_count: activity.successors.len(),
                    in_degree: twin.in_degree(id),
                    out_degree: twin.out_degree(id),
                    downstream_critical_depth: depths[i],
                    fte_ratio,
                    resource_overbooked: overbooked,
                    zombie_task: zombie,
                    resource_black_hole: overbooked,
                    percent_complete: activity.percent_complete,
                    risk_probability: activity.risk_probability,
                    risk_delay_impact_days: activity.risk_delay_impact_days,
                    cost_impact_of_risk: activity.cost_impact_of_risk.unwrap_or(0.0),
                    drift: DriftVelocity::compute(activity),
                    cost: CostPerformance::compute_optional(activity),
                    is_skill_bottleneck: skill.is_bottleneck(id),
                    skill_overload_pct: skill.overload_pct_for(id),
                    skill_variance_multiplier: skill.variance_for(id),
                    betweenness: centrality.betweenness,
                    eigenvector: centrality.eigenvector,
                    cluster_id: None,
                    archetype: None,
                }
            })
            .collect();

        Self { features }
    }

    pub fn get(&self, id: &str) -> Option<&ActivityFeatures> {
        self.features.iter().find(|f| f.activity_id == id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Length of the longest chain of critical successors below each activity.
///
/// Walks the processing order backwards so every successor is resolved
/// before its predecessor; edges pointing backwards in that order (cycle
/// closers) are skipped, which bounds the walk on cyclic graphs. Depths are
/// capped at [`MAX_CRITICAL_DEPTH`].
fn critical_depths(twin: &DigitalTwin) -> Vec<usize> {
    let order = twin.processing_order();
    let n = twin.len();
    let mut position = vec![0usize; n];
    for (pos, &i) in order.iter().enumerate() {
        position[i] = pos;
    }

    let activities = twin.activities();
    let mut depth = vec![0usize; n];
    for &i in order.iter().rev() {
        depth[i] = twin
            .successor_indices(i)
            .into_iter()
            .filter(|&s| position[s] > position[i] && activities[s].on_critical_path)
            .map(|s| (depth[s] + 1).min(MAX_CRITICAL_DEPTH))
            .max()
            .unwrap_or(0);
    }
    depth
}

#[cfg(test)]
#[path = "features_test.rs"]
mod tests;
