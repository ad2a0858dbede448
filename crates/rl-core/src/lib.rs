//! rl-core - Core library for Riskline
//!
//! This crate provides the activity model, engine configuration, the digital
//! twin (dependency graph), the critical path engine, and content hashing
//! used across all Riskline components.

pub mod activity;
pub mod activity_id;
pub mod cache;
pub mod checksum;
pub mod config;
pub mod critical_path;
pub mod error;
mod newtype_string;
pub(crate) mod serde_helpers;
pub mod twin;

pub use activity::{Activity, ActivityRecord, DEFAULT_DURATION_DAYS, DEFAULT_MAX_FTE};
pub use activity_id::ActivityId;
pub use cache::{CacheKey, ResultCache};
pub use checksum::{compute_checksum, content_hash};
pub use config::{
    ClusteringConfig, EngineConfig, ForecastConfig, MitigationConfig, ScoringConfig,
    TopologyConfig, WarningsConfig,
};
pub use critical_path::{
    planned_durations, ActivityTiming, CriticalPathEngine, CriticalPathResult, Scratch,
    CRITICAL_TOLERANCE,
};
pub use error::{CoreError, CoreResult};
pub use serde_helpers::parse_date;
pub use twin::DigitalTwin;
