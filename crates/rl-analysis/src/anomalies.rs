//! Schedule anomalies: zombie tasks and resource black holes.

use chrono::NaiveDate;
use rl_core::{Activity, ActivityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::features::ZOMBIE_PROGRESS_PCT;

/// Days overdue after which a blocked zombie is still reported.
pub const BLOCKED_ZOMBIE_GRACE_DAYS: i64 = 7;

/// A task that should have started but shows no progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieTask {
    pub activity_id: ActivityId,
    pub name: String,
    pub planned_start: NaiveDate,
    pub days_overdue: i64,
    /// Whether every predecessor is complete
    pub predecessors_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An interval where an overloaded resource also carries critical work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalOverlap {
    /// First and last day, inclusive
    pub period: (NaiveDate, NaiveDate),
    pub total_fte: f64,
    pub utilization: f64,
    pub activities: Vec<ActivityId>,
}

/// A resource whose concurrent allocation exceeds its capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBlackHole {
    pub resource_id: String,
    /// Summed allocation over capacity, ignoring time
    pub utilization: f64,
    /// Peak concurrent allocation over capacity
    pub max_overlap_utilization: f64,
    pub total_fte: f64,
    pub max_fte: f64,
    pub max_overlap_fte: f64,
    pub max_overlap_period: Option<(NaiveDate, NaiveDate)>,
    pub activity_count: usize,
    pub activities: Vec<ActivityId>,
    pub critical_overlaps: Vec<CriticalOverlap>,
}

/// All anomalies of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub zombie_tasks: Vec<ZombieTask>,
    pub black_holes: Vec<ResourceBlackHole>,
    pub total_anomalies: usize,
}

impl AnomalyReport {
    pub fn detect(activities: &[Activity], reference_date: NaiveDate) -> Self {
        let zombie_tasks = detect_zombie_tasks(activities, reference_date);
        let black_holes = detect_black_holes(activities);
        let total_anomalies = zombie_tasks.len() + black_holes.len();
        Self {
            zombie_tasks,
            black_holes,
            total_anomalies,
        }
    }
}

/// Tasks whose planned start has passed without an actual start and with
/// less than 5% progress.
///
/// A zombie whose predecessors are not all complete is only reported once
/// it is more than a week overdue. Predecessors that are not in the project
/// count as incomplete.
pub fn detect_zombie_tasks(activities: &[Activity], reference_date: NaiveDate) -> Vec<ZombieTask> {
    let by_id: HashMap<&str, &Activity> = activities.iter().map(|a| (a.id.as_str(), a)).collect();

    let predecessors_complete = |activity: &Activity| {
        activity
            .predecessors
            .iter()
            .filter(|p| !p.trim().is_empty())
            .all(|p| by_id.get(p.trim()).is_some_and(|pred| pred.is_complete()))
    };

    let mut zombies = Vec::new();
    for activity in activities {
        let Some(planned_start) = activity.planned_start else {
            continue;
        };
        if planned_start > reference_date
            || activity.actual_start.is_some()
            || activity.percent_complete >= ZOMBIE_PROGRESS_PCT
        {
            continue;
        }

        let days_overdue = (reference_date - planned_start).num_days();
        if predecessors_complete(activity) {
            zombies.push(ZombieTask {
                activity_id: activity.id.clone(),
                name: activity.name.clone(),
                planned_start,
                days_overdue,
                predecessors_ready: true,
                note: None,
            });
        } else if days_overdue > BLOCKED_ZOMBIE_GRACE_DAYS {
            zombies.push(ZombieTask {
                activity_id: activity.id.clone(),
                name: activity.name.clone(),
                planned_start,
                days_overdue,
                predecessors_ready: false,
                note: Some("Planned start has passed but progress is 0%".to_string()),
            });
        }
    }
    zombies
}

/// Occupied days as a half-open range `[start, end)`.
struct Window<'a> {
    start: NaiveDate,
    end: NaiveDate,
    activity: &'a Activity,
}

struct ResourceLoad<'a> {
    resource_id: &'a str,
    max_fte: f64,
    windows: Vec<Window<'a>>,
}

/// Resources whose allocation, summed over concurrently active tasks,
/// exceeds capacity at some point in time.
///
/// Each task occupies its actual window when known, else its planned one;
/// tasks without a usable window are ignored. Both boundary dates are
/// working days, so a task finishing on the 10th overlaps one starting on
/// the 10th but not one starting on the 11th.
pub fn detect_black_holes(activities: &[Activity]) -> Vec<ResourceBlackHole> {
    let mut loads: Vec<ResourceLoad<'_>> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for activity in activities {
        let Some(resource_id) = activity.resource_id.as_deref() else {
            continue;
        };
        let index = *slot.entry(resource_id).or_insert_with(|| {
            loads.push(ResourceLoad {
                resource_id,
                max_fte: activity.max_fte(),
                windows: Vec::new(),
            });
            loads.len() - 1
        });

        let start = activity.actual_start.or(activity.planned_start);
        let finish = activity.actual_finish.or(activity.planned_finish);
        let (Some(start), Some(finish)) = (start, finish) else {
            continue;
        };
        if finish < start {
            log::debug!("Skipping inverted window for activity '{}'", activity.id);
            continue;
        }
        let Some(end) = finish.succ_opt() else {
            continue;
        };
        loads[index].windows.push(Window {
            start,
            end,
            activity,
        });
    }

    loads
        .into_iter()
        .filter_map(|load| analyse_resource(&load))
        .collect()
}

fn analyse_resource(load: &ResourceLoad<'_>) -> Option<ResourceBlackHole> {
    if load.windows.is_empty() {
        return None;
    }
    let max_fte = load.max_fte;

    let points: Vec<NaiveDate> = load
        .windows
        .iter()
        .flat_map(|w| [w.start, w.end])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut max_overlap = 0.0;
    let mut max_overlap_period = None;
    let mut critical_overlaps = Vec::new();

    // every elementary range between consecutive boundaries is either fully
    // inside a window or fully outside it
    for pair in points.windows(2) {
        let (from, until) = (pair[0], pair[1]);
        let overlapping: Vec<&Window<'_>> = load
            .windows
            .iter()
            .filter(|w| w.start <= from && w.end >= until)
            .collect();
        if overlapping.is_empty() {
            continue;
        }
        let to = until.pred_opt().unwrap_or(from);
        let total: f64 = overlapping.iter().map(|w| w.activity.fte_allocation).sum();

        if total > max_overlap {
            max_overlap = total;
            max_overlap_period = Some((from, to));
        }

        if total > max_fte && overlapping.iter().any(|w| w.activity.on_critical_path) {
            critical_overlaps.push(CriticalOverlap {
                period: (from, to),
                total_fte: total,
                utilization: total / max_fte,
                activities: overlapping.iter().map(|w| w.activity.id.clone()).collect(),
            });
        }
    }

    if max_overlap <= max_fte {
        return None;
    }

    let total_fte: f64 = load.windows.iter().map(|w| w.activity.fte_allocation).sum();
    Some(ResourceBlackHole {
        resource_id: load.resource_id.to_string(),
        utilization: total_fte / max_fte,
        max_overlap_utilization: max_overlap / max_fte,
        total_fte,
        max_fte,
        max_overlap_fte: max_overlap,
        max_overlap_period,
        activity_count: load.windows.len(),
        activities: load.windows.iter().map(|w| w.activity.id.clone()).collect(),
        critical_overlaps,
    })
}

#[cfg(test)]
#[path = "anomalies_test.rs"]
mod tests;
