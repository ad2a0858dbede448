//! Project-wide risk ranking.

use crate::error::PredictorResult;
use crate::factors::{RiskFactors, RiskLevel};
use crate::predictor::{HybridRiskModel, RiskPredictor};
use crate::scoring::RuleBasedRiskModel;
use chrono::NaiveDate;
use rl_analysis::{ActivityFeatures, ProjectAnalysis, RiskArchetype, TopologyScore};
use rl_core::{Activity, ActivityId, EngineConfig};
use serde::{Deserialize, Serialize};

/// Risk assessment of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRisk {
    pub activity_id: ActivityId,
    pub name: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: RiskFactors,
    pub features: ActivityFeatures,
    pub percent_complete: f64,
    pub on_critical_path: bool,
    /// Cluster metadata; consumed by the forecast, not by the score
    pub cluster_id: usize,
    pub archetype: RiskArchetype,
    pub topology: Option<TopologyScore>,
}

/// Scored activities of a project, highest risk first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRisks {
    pub risks: Vec<ActivityRisk>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ProjectRisks {
    /// Score every activity.
    ///
    /// Fails only when the predictor errors and fallback is disabled.
    pub fn compute(
        activities: &[Activity],
        config: &EngineConfig,
        reference_date: NaiveDate,
        predictor: Option<&dyn RiskPredictor>,
    ) -> PredictorResult<Self> {
        let analysis = ProjectAnalysis::compute(activities, config, reference_date);
        Self::from_analysis(&analysis, config, predictor)
    }

    /// Score a project that has already been analyzed.
    pub fn from_analysis(
        analysis: &ProjectAnalysis,
        config: &EngineConfig,
        predictor: Option<&dyn RiskPredictor>,
    ) -> PredictorResult<Self> {
        let rule = RuleBasedRiskModel::new();
        let hybrid = HybridRiskModel::new(predictor, &config.scoring);
        let features = &analysis.features.features;
        let rule_scores = rule.score_population(features);

        let mut risks = Vec::with_capacity(features.len());
        for ((activity, f), rule_score) in analysis
            .twin
            .activities()
            .iter()
            .zip(features)
            .zip(rule_scores)
        {
            let (risk_score, method) = hybrid.predict(f, rule_score)?;
            let id = activity.id.as_str();
            risks.push(ActivityRisk {
                activity_id: activity.id.clone(),
                name: activity.name.clone(),
                risk_score,
                risk_level: RiskLevel::from_score(risk_score),
                risk_factors: rule.risk_factors(f).with_method(method),
                features: f.clone(),
                percent_complete: activity.percent_complete,
                on_critical_path: activity.on_critical_path,
                cluster_id: analysis.clustering.cluster_of(id),
                archetype: analysis.clustering.archetype_of(id),
                topology: analysis.topology.get(id).copied(),
            });
        }

        // Stable: equal scores keep input order.
        risks.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

        Ok(Self {
            risks,
            warnings: analysis.warnings(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&ActivityRisk> {
        self.risks.iter().find(|r| r.activity_id == id)
    }

    /// The `n` riskiest activities.
    pub fn top(&self, n: usize) -> &[ActivityRisk] {
        &self.risks[..n.min(self.risks.len())]
    }

    /// Activities at or above the high-risk threshold.
    pub fn high_risk_count(&self) -> usize {
        self.risks
            .iter()
            .filter(|r| r.risk_level == RiskLevel::High)
            .count()
    }

    pub fn len(&self) -> usize {
        self.risks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
