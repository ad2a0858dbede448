//! rl-analysis: forensic intelligence for schedule risk
//!
//! This crate turns a project's activities and digital twin into the
//! signals that shape the forecast: drift, cost performance, skill
//! bottlenecks, graph centrality, per-activity features, risk archetype
//! clusters, schedule anomalies, and the resulting simulation parameters.
//! [`ProjectAnalysis`] runs the whole chain once per request.

pub mod anomalies;
pub mod cluster;
pub mod cost;
pub mod drift;
pub(crate) mod error;
pub mod features;
pub mod modulator;
pub mod project;
pub mod skill;
pub mod topology;

pub use anomalies::{AnomalyReport, CriticalOverlap, ResourceBlackHole, ZombieTask};
pub use cluster::{cluster, ArchetypeKind, ClusterInput, Clustering, RiskArchetype};
pub use cost::CostPerformance;
pub use drift::DriftVelocity;
pub use error::{AnalysisError, AnalysisResult};
pub use features::{float_score, progress_slip, ActivityFeatures, FeatureSet};
pub use modulator::{modulate, SimulationParameters};
pub use project::ProjectAnalysis;
pub use skill::{parse_skill_tags, SkillAnalysis, SkillBottleneck};
pub use topology::{TopologyMetrics, TopologyScore};
