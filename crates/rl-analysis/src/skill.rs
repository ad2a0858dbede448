//! Skill-constraint analysis.
//!
//! Generic FTE counts hide the case where two activities on the same
//! resource both need a scarce skill. Demand is accumulated per
//! `(skill, resource)` pair; a pair whose total demand exceeds the
//! resource's capacity is a bottleneck, and every activity feeding it gets a
//! wider duration distribution.

use chrono::NaiveDate;
use rl_core::{Activity, ActivityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Variance added per overloaded skill.
const VARIANCE_PER_SKILL: f64 = 0.2;

/// Upper bound on the skill variance multiplier.
const MAX_SKILL_VARIANCE: f64 = 2.0;

/// Split a tag string into lower-cased skills.
///
/// `;` takes precedence over `,`; a string with neither is a single skill.
pub fn parse_skill_tags(raw: &str) -> Vec<String> {
    let separator = if raw.contains(';') {
        Some(';')
    } else if raw.contains(',') {
        Some(',')
    } else {
        None
    };

    let skills: Vec<String> = match separator {
        Some(sep) => raw
            .split(sep)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    };

    if !skills.is_empty() {
        return skills;
    }
    let single = raw.trim().to_lowercase();
    if single.is_empty() {
        Vec::new()
    } else {
        vec![single]
    }
}

/// An overloaded `(skill, resource)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillBottleneck {
    pub skill: String,
    pub resource_id: String,
    /// Summed FTE demand, rounded to 2 decimals
    pub total_fte_demand: f64,
    /// Capacity, rounded to 2 decimals
    pub max_fte: f64,
    /// Demand over capacity in percent, rounded to 1 decimal
    pub overload_pct: f64,
    pub activities: Vec<ActivityId>,
    /// Union of the contributing planned windows, `"start to finish"`
    pub time_window: String,
}

#[derive(Debug)]
struct Demand {
    total_fte: f64,
    max_fte: f64,
    activities: Vec<ActivityId>,
    window_start: NaiveDate,
    window_end: NaiveDate,
}

/// Result of a skill-constraint pass over a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub skill_bottlenecks: Vec<SkillBottleneck>,
    /// Distinct overloaded skills per activity
    pub activity_skill_risks: BTreeMap<ActivityId, Vec<String>>,
    pub variance_increase_map: BTreeMap<ActivityId, f64>,
}

impl SkillAnalysis {
    /// Analyse skill demand across a project.
    ///
    /// `_reference_date` is accepted so callers can pass the same date to
    /// every extractor; demand is summed over whole planned windows and does
    /// not depend on it.
    pub fn compute(activities: &[Activity], _reference_date: Option<NaiveDate>) -> Self {
        let mut demand: Vec<((String, String), Demand)> = Vec::new();
        let mut slot: HashMap<(String, String), usize> = HashMap::new();

        for activity in activities {
            let (Some(resource_id), Some(tags)) = (&activity.resource_id, &activity.skill_tags)
            else {
                continue;
            };
            let skills = parse_skill_tags(tags);
            if skills.is_empty() {
                continue;
            }
            let (Some(start), Some(finish)) = (activity.planned_start, activity.planned_finish)
            else {
                continue;
            };

            // capacity comes from the first contributing activity
            for skill in skills {
                let key = (skill, resource_id.clone());
                let index = *slot.entry(key.clone()).or_insert_with(|| {
                    demand.push((
                        key,
                        Demand {
                            total_fte: 0.0,
                            max_fte: activity.max_fte(),
                            activities: Vec::new(),
                            window_start: start,
                            window_end: finish,
                        },
                    ));
                    demand.len() - 1
                });

                let entry = &mut demand[index].1;
                entry.total_fte += activity.fte_allocation;
                entry.activities.push(activity.id.clone());
                entry.window_start = entry.window_start.min(start);
                entry.window_end = entry.window_end.max(finish);
            }
        }

        let mut analysis = SkillAnalysis::default();
        for ((skill, resource_id), data) in demand {
            if data.total_fte <= data.max_fte {
                continue;
            }
            let max_fte = data.max_fte;

            for id in &data.activities {
                let skills = analysis.activity_skill_risks.entry(id.clone()).or_default();
                if !skills.contains(&skill) {
                    skills.push(skill.clone());
                }
                let variance =
                    (1.0 + skills.len() as f64 * VARIANCE_PER_SKILL).min(MAX_SKILL_VARIANCE);
                analysis.variance_increase_map.insert(id.clone(), variance);
            }

            analysis.skill_bottlenecks.push(SkillBottleneck {
                overload_pct: round_to(data.total_fte / max_fte * 100.0, 1),
                total_fte_demand: round_to(data.total_fte, 2),
                max_fte: round_to(max_fte, 2),
                time_window: format!("{} to {}", data.window_start, data.window_end),
                activities: data.activities,
                resource_id,
                skill,
            });
        }

        if !analysis.skill_bottlenecks.is_empty() {
            log::debug!(
                "Found {} skill bottleneck(s) affecting {} activities",
                analysis.skill_bottlenecks.len(),
                analysis.activity_skill_risks.len()
            );
        }
        analysis
    }

    /// Whether an activity feeds any bottleneck.
    pub fn is_bottleneck(&self, id: &str) -> bool {
        self.activity_skill_risks.contains_key(id)
    }

    /// Variance multiplier for an activity; 1.0 when unaffected.
    pub fn variance_for(&self, id: &str) -> f64 {
        self.variance_increase_map.get(id).copied().unwrap_or(1.0)
    }

    /// Worst overload among the bottlenecks an activity feeds.
    pub fn overload_pct_for(&self, id: &str) -> f64 {
        self.skill_bottlenecks
            .iter()
            .filter(|b| b.activities.iter().any(|a| a == id))
            .map(|b| b.overload_pct)
            .fold(0.0, f64::max)
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
#[path = "skill_test.rs"]
mod tests;
