//! Activity records and validation.
//!
//! [`ActivityRecord`] is the permissive shape handed over by ingestion
//! (every field optional). [`Activity`] is the validated, immutable record
//! the engine works on: it always has an identifier and a name.

use crate::activity_id::ActivityId;
use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{flexible_date, id_list};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default duration (days) substituted when an activity carries none.
pub const DEFAULT_DURATION_DAYS: f64 = 1.0;

/// Default resource capacity when `resource_max_fte` is absent or not positive.
pub const DEFAULT_MAX_FTE: f64 = 1.0;

/// Raw activity record as received from an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    #[serde(alias = "activity_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(with = "flexible_date")]
    pub planned_start: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub planned_finish: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub baseline_start: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub baseline_finish: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub actual_start: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub actual_finish: Option<NaiveDate>,
    pub planned_duration: Option<f64>,
    pub baseline_duration: Option<f64>,
    pub remaining_duration: Option<f64>,
    pub percent_complete: Option<f64>,
    pub total_float: Option<f64>,
    pub risk_probability: Option<f64>,
    #[serde(alias = "risk_delay_impact")]
    pub risk_delay_impact_days: Option<f64>,
    pub planned_cost: Option<f64>,
    pub actual_cost_to_date: Option<f64>,
    pub cost_impact_of_risk: Option<f64>,
    #[serde(deserialize_with = "id_list")]
    pub predecessors: Vec<String>,
    #[serde(deserialize_with = "id_list")]
    pub successors: Vec<String>,
    pub on_critical_path: Option<bool>,
    pub resource_id: Option<String>,
    pub fte_allocation: Option<f64>,
    pub resource_max_fte: Option<f64>,
    pub skill_tags: Option<String>,
}

/// A validated project activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    #[serde(default, with = "flexible_date")]
    pub planned_start: Option<NaiveDate>,
    #[serde(default, with = "flexible_date")]
    pub planned_finish: Option<NaiveDate>,
    #[serde(default, with = "flexible_date")]
    pub baseline_start: Option<NaiveDate>,
    #[serde(default, with = "flexible_date")]
    pub baseline_finish: Option<NaiveDate>,
    #[serde(default, with = "flexible_date")]
    pub actual_start: Option<NaiveDate>,
    #[serde(default, with = "flexible_date")]
    pub actual_finish: Option<NaiveDate>,
    #[serde(default)]
    pub planned_duration: Option<f64>,
    #[serde(default)]
    pub baseline_duration: Option<f64>,
    #[serde(default)]
    pub remaining_duration: Option<f64>,
    /// Percent complete, 0–100.
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default)]
    pub total_float: Option<f64>,
    /// Risk-register probability, 0–1.
    #[serde(default)]
    pub risk_probability: f64,
    #[serde(default)]
    pub risk_delay_impact_days: f64,
    #[serde(default)]
    pub planned_cost: Option<f64>,
    #[serde(default)]
    pub actual_cost_to_date: Option<f64>,
    #[serde(default)]
    pub cost_impact_of_risk: Option<f64>,
    #[serde(default)]
    pub predecessors: Vec<String>,
    #[serde(default)]
    pub successors: Vec<String>,
    #[serde(default)]
    pub on_critical_path: bool,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub fte_allocation: f64,
    #[serde(default)]
    pub resource_max_fte: Option<f64>,
    #[serde(default)]
    pub skill_tags: Option<String>,
}

impl Activity {
    /// Create an activity with every optional field empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ActivityId::new(id),
            name: name.into(),
            planned_start: None,
            planned_finish: None,
            baseline_start: None,
            baseline_finish: None,
            actual_start: None,
            actual_finish: None,
            planned_duration: None,
            baseline_duration: None,
            remaining_duration: None,
            percent_complete: 0.0,
            total_float: None,
            risk_probability: 0.0,
            risk_delay_impact_days: 0.0,
            planned_cost: None,
            actual_cost_to_date: None,
            cost_impact_of_risk: None,
            predecessors: Vec::new(),
            successors: Vec::new(),
            on_critical_path: false,
            resource_id: None,
            fte_allocation: 0.0,
            resource_max_fte: None,
            skill_tags: None,
        }
    }

    /// Validate a raw record.
    ///
    /// Returns a human-readable reason when the record lacks an identifier or
    /// a name. Out-of-range percentages and probabilities are clamped.
    pub fn from_record(record: ActivityRecord) -> Result<Self, String> {
        let id = record
            .id
            .as_deref()
            .and_then(ActivityId::try_new)
            .ok_or_else(|| "missing activity id".to_string())?;
        let name = record
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| format!("activity '{}' is missing a name", id))?
            .to_string();

        Ok(Self {
            id,
            name,
            planned_start: record.planned_start,
            planned_finish: record.planned_finish,
            baseline_start: record.baseline_start,
            baseline_finish: record.baseline_finish,
            actual_start: record.actual_start,
            actual_finish: record.actual_finish,
            planned_duration: finite(record.planned_duration),
            baseline_duration: finite(record.baseline_duration),
            remaining_duration: finite(record.remaining_duration),
            percent_complete: finite(record.percent_complete)
                .unwrap_or(0.0)
                .clamp(0.0, 100.0),
            total_float: finite(record.total_float),
            risk_probability: finite(record.risk_probability)
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            risk_delay_impact_days: finite(record.risk_delay_impact_days)
                .unwrap_or(0.0)
                .max(0.0),
            planned_cost: finite(record.planned_cost),
            actual_cost_to_date: finite(record.actual_cost_to_date),
            cost_impact_of_risk: finite(record.cost_impact_of_risk),
            predecessors: record.predecessors,
            successors: record.successors,
            on_critical_path: record.on_critical_path.unwrap_or(false),
            resource_id: record
                .resource_id
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            fte_allocation: finite(record.fte_allocation).unwrap_or(0.0).max(0.0),
            resource_max_fte: finite(record.resource_max_fte),
            skill_tags: record.skill_tags.filter(|s| !s.trim().is_empty()),
        })
    }

    /// Validate a batch of records.
    ///
    /// Malformed records and duplicate identifiers are dropped one by one with
    /// a warning; the rest of the batch is kept in input order.
    pub fn from_records(records: Vec<ActivityRecord>) -> (Vec<Activity>, Vec<String>) {
        let mut activities = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();
        let mut seen: HashSet<ActivityId> = HashSet::new();

        for (position, record) in records.into_iter().enumerate() {
            match Self::from_record(record) {
                Ok(activity) => {
                    if !seen.insert(activity.id.clone()) {
                        let msg = format!(
                            "Skipping activity record #{}: duplicate activity id '{}'",
                            position + 1,
                            activity.id
                        );
                        log::warn!("{}", msg);
                        warnings.push(msg);
                        continue;
                    }
                    activities.push(activity);
                }
                Err(reason) => {
                    let msg = format!("Skipping activity record #{}: {}", position + 1, reason);
                    log::warn!("{}", msg);
                    warnings.push(msg);
                }
            }
        }

        (activities, warnings)
    }

    /// Read a JSON array of activity records from `path` and validate it.
    ///
    /// Returns the accepted activities and one warning per rejected record.
    pub fn load_file(path: &Path) -> CoreResult<(Vec<Activity>, Vec<String>)> {
        if !path.exists() {
            return Err(CoreError::ActivityFileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let records: Vec<ActivityRecord> =
            serde_json::from_str(&content).map_err(|e| CoreError::ActivityParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let total = records.len();
        let (activities, warnings) = Self::from_records(records);
        log::debug!(
            "Loaded {} of {} activity records from {}",
            activities.len(),
            total,
            path.display()
        );
        Ok((activities, warnings))
    }

    /// Duration the simulation starts from: remaining, else planned, else
    /// baseline, else one day. Non-positive values count as missing.
    pub fn base_duration(&self) -> f64 {
        first_positive(&[
            self.remaining_duration,
            self.planned_duration,
            self.baseline_duration,
        ])
        .unwrap_or(DEFAULT_DURATION_DAYS)
    }

    /// Planned duration for deterministic passes: planned, else baseline,
    /// else one day.
    pub fn planned_or_baseline_duration(&self) -> f64 {
        first_positive(&[self.planned_duration, self.baseline_duration])
            .unwrap_or(DEFAULT_DURATION_DAYS)
    }

    /// Whether any of the duration sources carries a usable value.
    pub fn has_valid_duration(&self) -> bool {
        first_positive(&[
            self.remaining_duration,
            self.planned_duration,
            self.baseline_duration,
        ])
        .is_some()
    }

    /// Resource capacity, defaulting to one FTE.
    pub fn max_fte(&self) -> f64 {
        match self.resource_max_fte {
            Some(max) if max > 0.0 => max,
            _ => DEFAULT_MAX_FTE,
        }
    }

    /// Allocation divided by capacity; 0 when no capacity is recorded.
    pub fn fte_ratio(&self) -> f64 {
        match self.resource_max_fte {
            Some(max) if max > 0.0 => self.fte_allocation / max,
            _ => 0.0,
        }
    }

    /// Whether the activity is finished (100% or an actual finish date).
    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100.0 || self.actual_finish.is_some()
    }

    /// Risk-register expected delay: probability times impact.
    pub fn expected_delay_days(&self) -> f64 {
        self.risk_probability * self.risk_delay_impact_days
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn first_positive(candidates: &[Option<f64>]) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| *v > 0.0)
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
