//! One-shot forensic analysis of a whole project.
//!
//! Runs the extractors in dependency order (twin, skill, topology, features,
//! clustering) so forecast and risk callers share a single pass. Topology is
//! computed once here and never again per simulation.

use crate::cluster::{cluster, ClusterInput, Clustering};
use crate::features::FeatureSet;
use crate::modulator::{modulate, SimulationParameters};
use crate::skill::SkillAnalysis;
use crate::topology::TopologyMetrics;
use chrono::NaiveDate;
use rl_core::{Activity, ActivityId, DigitalTwin, EngineConfig};
use std::collections::BTreeMap;
use std::time::Instant;

/// Everything the forensic layers know about a project.
#[derive(Debug, Clone)]
pub struct ProjectAnalysis {
    pub twin: DigitalTwin,
    pub skill: SkillAnalysis,
    pub topology: TopologyMetrics,
    /// Features with cluster ids and archetypes attached
    pub features: FeatureSet,
    pub clustering: Clustering,
}

impl ProjectAnalysis {
    pub fn compute(
        activities: &[Activity],
        config: &EngineConfig,
        reference_date: NaiveDate,
    ) -> Self {
        let started = Instant::now();
        let twin = DigitalTwin::build(activities);
        let skill = SkillAnalysis::compute(twin.activities(), Some(reference_date));
        let topology = TopologyMetrics::compute(&twin, &config.topology);
        let raw = FeatureSet::compute(&twin, reference_date, &skill, &topology);

        let inputs: Vec<ClusterInput> = raw
            .features
            .iter()
            .map(|f| ClusterInput::from_features(f.activity_id.clone(), f))
            .collect();
        let clustering = cluster(&inputs, &config.clustering);

        let features = FeatureSet {
            features: raw
                .features
                .into_iter()
                .map(|f| {
                    let cluster_id = clustering.cluster_of(f.activity_id.as_str());
                    f.with_cluster(cluster_id)
                })
                .collect(),
        };

        log::debug!(
            "Analyzed {} activities ({} skill bottlenecks) in {:?}",
            twin.len(),
            skill.skill_bottlenecks.len(),
            started.elapsed()
        );

        Self {
            twin,
            skill,
            topology,
            features,
            clustering,
        }
    }

    /// Modulated simulation parameters for every activity.
    pub fn simulation_parameters(&self) -> BTreeMap<ActivityId, SimulationParameters> {
        self.twin
            .activities()
            .iter()
            .zip(&self.features.features)
            .map(|(activity, features)| {
                let id = activity.id.as_str();
                let archetype = self.clustering.archetype_of(id);
                let params = modulate(
                    activity,
                    features,
                    &archetype,
                    self.topology.get(id),
                    &self.skill,
                );
                (activity.id.clone(), params)
            })
            .collect()
    }

    /// Warnings raised while analyzing (cycles, clustering fallback).
    pub fn warnings(&self) -> Vec<String> {
        self.twin
            .cycle_warning()
            .into_iter()
            .chain(self.clustering.warning.as_deref())
            .map(String::from)
            .collect()
    }
}
