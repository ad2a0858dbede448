//! Engine configuration from riskline.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration from riskline.yml
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Monte Carlo settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Risk archetype clustering settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Centrality settings
    #[serde(default)]
    pub topology: TopologyConfig,

    /// Risk scoring and predictor blending
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Warning presentation
    #[serde(default)]
    pub warnings: WarningsConfig,

    /// What-if analysis budgets
    #[serde(default)]
    pub mitigation: MitigationConfig,
}

/// Monte Carlo forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Number of simulation runs
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    /// Base seed; `None` draws a fresh seed per forecast
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wall-clock limit enforced by the caller
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Spread runs across the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            seed: None,
            timeout_secs: None,
            parallel: true,
        }
    }
}

/// k-means settings for risk archetypes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusteringConfig {
    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default = "default_cluster_seed")]
    pub seed: u64,

    /// Restarts; the lowest-inertia result wins
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Centroid shift under which Lloyd iterations stop
    #[serde(default = "default_cluster_tolerance")]
    pub tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            seed: default_cluster_seed(),
            n_init: default_n_init(),
            max_iter: default_max_iter(),
            tolerance: default_cluster_tolerance(),
        }
    }
}

/// Eigenvector centrality settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyConfig {
    #[serde(default = "default_eigen_max_iter")]
    pub eigenvector_max_iter: usize,

    #[serde(default = "default_eigen_tolerance")]
    pub eigenvector_tolerance: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            eigenvector_max_iter: default_eigen_max_iter(),
            eigenvector_tolerance: default_eigen_tolerance(),
        }
    }
}

/// Risk scoring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Consult a trained predictor when one is supplied
    #[serde(default)]
    pub use_ml: bool,

    /// Share of the ML score in the blended score
    #[serde(default = "default_ml_weight")]
    pub ml_weight: f64,

    /// Fall back to the rule score when the predictor fails
    #[serde(default = "default_true")]
    pub fallback_to_rule: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            use_ml: false,
            ml_weight: default_ml_weight(),
            fallback_to_rule: true,
        }
    }
}

/// Warning presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarningsConfig {
    /// Ids listed in a warning before it is summarized as "(+N more)"
    #[serde(default = "default_max_listed_ids")]
    pub max_listed_ids: usize,
}

impl Default for WarningsConfig {
    fn default() -> Self {
        Self {
            max_listed_ids: default_max_listed_ids(),
        }
    }
}

/// Simulation budgets for mitigation analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MitigationConfig {
    #[serde(default = "default_simulations")]
    pub baseline_simulations: usize,

    #[serde(default = "default_candidate_simulations")]
    pub candidate_simulations: usize,
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            baseline_simulations: default_simulations(),
            candidate_simulations: default_candidate_simulations(),
        }
    }
}

fn default_simulations() -> usize {
    2000
}

fn default_k() -> usize {
    4
}

fn default_cluster_seed() -> u64 {
    42
}

fn default_n_init() -> usize {
    10
}

fn default_max_iter() -> usize {
    300
}

fn default_cluster_tolerance() -> f64 {
    1e-4
}

fn default_eigen_max_iter() -> usize {
    1000
}

fn default_eigen_tolerance() -> f64 {
    1e-6
}

fn default_ml_weight() -> f64 {
    0.7
}

fn default_max_listed_ids() -> usize {
    5
}

fn default_candidate_simulations() -> usize {
    500
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    ///
    /// A blank document yields the defaults.
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: EngineConfig = if content.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for riskline.yml or riskline.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("riskline.yml");
        let yaml_path = dir.join("riskline.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.forecast.simulations == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "forecast.simulations must be at least 1".to_string(),
            });
        }

        if self.mitigation.baseline_simulations == 0 || self.mitigation.candidate_simulations == 0
        {
            return Err(CoreError::ConfigInvalid {
                message: "mitigation simulation budgets must be at least 1".to_string(),
            });
        }

        if self.clustering.k == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "clustering.k must be at least 1".to_string(),
            });
        }

        if self.clustering.n_init == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "clustering.n_init must be at least 1".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.scoring.ml_weight) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "scoring.ml_weight must be between 0 and 1, got {}",
                    self.scoring.ml_weight
                ),
            });
        }

        if self.warnings.max_listed_ids == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "warnings.max_listed_ids must be at least 1".to_string(),
            });
        }

        // NaN fails both comparisons
        let eigen_ok = self.topology.eigenvector_tolerance > 0.0;
        let cluster_ok = self.clustering.tolerance >= 0.0;
        if !eigen_ok || !cluster_ok {
            return Err(CoreError::ConfigInvalid {
                message: "tolerances must be non-negative numbers (eigenvector tolerance > 0)"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
