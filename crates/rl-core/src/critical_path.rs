//! Critical Path Method over a [`DigitalTwin`].
//!
//! The engine precomputes a dense index arena once per twin: the processing
//! order and, per activity, the predecessors and successors that are
//! activities and sit on the correct side of that order. A Monte Carlo run
//! then needs only four `f64` buffers, which callers can reuse through
//! [`Scratch`].
//!
//! On a cyclic graph the order is best-effort, and edges that point backwards
//! in it are ignored by both passes. The remaining edges form a DAG, so
//! `LS >= ES` still holds and the engine never fails.

use crate::activity::Activity;
use crate::activity_id::ActivityId;
use crate::twin::DigitalTwin;
use serde::Serialize;

/// Tolerance under which an activity counts as critical (`|ES - LS|`).
pub const CRITICAL_TOLERANCE: f64 = 0.01;

/// Reusable per-run buffers.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    pub es: Vec<f64>,
    pub ef: Vec<f64>,
    pub ls: Vec<f64>,
    pub lf: Vec<f64>,
}

impl Scratch {
    /// Buffers sized for `n` activities.
    pub fn with_len(n: usize) -> Self {
        Self {
            es: vec![0.0; n],
            ef: vec![0.0; n],
            ls: vec![0.0; n],
            lf: vec![0.0; n],
        }
    }

    fn ensure_len(&mut self, n: usize) {
        if self.es.len() != n {
            *self = Self::with_len(n);
        }
    }

    /// Whether activity `i` was critical in the last pass.
    pub fn is_critical(&self, i: usize) -> bool {
        (self.es[i] - self.ls[i]).abs() < CRITICAL_TOLERANCE
    }

    /// Total float of activity `i` in the last pass, clamped to zero.
    pub fn total_float(&self, i: usize) -> f64 {
        (self.ls[i] - self.es[i]).max(0.0)
    }
}

/// Timing of one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTiming {
    pub activity_id: ActivityId,
    pub duration: f64,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    pub critical: bool,
}

/// Outcome of a full CPM pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPathResult {
    /// Earliest finish of the whole project
    pub project_finish: f64,

    /// Per-activity timings in activity input order
    pub timings: Vec<ActivityTiming>,
}

impl CriticalPathResult {
    /// Ids of critical activities, in input order.
    pub fn critical_ids(&self) -> Vec<&ActivityId> {
        self.timings
            .iter()
            .filter(|t| t.critical)
            .map(|t| &t.activity_id)
            .collect()
    }

    /// Timing of a single activity.
    pub fn timing(&self, id: &str) -> Option<&ActivityTiming> {
        self.timings.iter().find(|t| t.activity_id == id)
    }
}

/// Index arena for repeated forward/backward passes.
#[derive(Debug, Clone)]
pub struct CriticalPathEngine {
    ids: Vec<ActivityId>,
    order: Vec<usize>,
    preds: Vec<Vec<usize>>,
    succs: Vec<Vec<usize>>,
}

impl CriticalPathEngine {
    /// Precompute the arena for a twin.
    pub fn new(twin: &DigitalTwin) -> Self {
        let n = twin.len();
        let order = twin.processing_order().to_vec();

        let mut position = vec![usize::MAX; n];
        for (pos, &i) in order.iter().enumerate() {
            position[i] = pos;
        }

        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        for i in 0..n {
            preds[i] = twin
                .predecessor_indices(i)
                .into_iter()
                .filter(|&p| position[p] < position[i])
                .collect();
            succs[i] = twin
                .successor_indices(i)
                .into_iter()
                .filter(|&s| position[s] > position[i])
                .collect();
        }

        Self {
            ids: twin.activities().iter().map(|a| a.id.clone()).collect(),
            order,
            preds,
            succs,
        }
    }

    /// Number of activities in the arena.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Run the forward and backward passes into `scratch`, returning the
    /// project finish. `durations` is indexed by activity position.
    pub fn compute_into(&self, durations: &[f64], scratch: &mut Scratch) -> f64 {
        let n = self.ids.len();
        scratch.ensure_len(n);
        if n == 0 {
            return 0.0;
        }

        let duration = |i: usize| durations.get(i).copied().unwrap_or(0.0);

        for &i in &self.order {
            let es = self.preds[i]
                .iter()
                .map(|&p| scratch.ef[p])
                .fold(0.0, f64::max);
            scratch.es[i] = es;
            scratch.ef[i] = es + duration(i);
        }

        let project_finish = scratch.ef.iter().copied().fold(0.0, f64::max);

        for &i in self.order.iter().rev() {
            let lf = self.succs[i]
                .iter()
                .map(|&s| scratch.ls[s])
                .fold(project_finish, f64::min);
            scratch.lf[i] = lf;
            scratch.ls[i] = lf - duration(i);
        }

        project_finish
    }

    /// Full pass with per-activity timings.
    pub fn compute(&self, durations: &[f64]) -> CriticalPathResult {
        let mut scratch = Scratch::with_len(self.ids.len());
        let project_finish = self.compute_into(durations, &mut scratch);

        let timings = self
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| ActivityTiming {
                activity_id: id.clone(),
                duration: durations.get(i).copied().unwrap_or(0.0),
                early_start: scratch.es[i],
                early_finish: scratch.ef[i],
                late_start: scratch.ls[i],
                late_finish: scratch.lf[i],
                total_float: scratch.total_float(i),
                critical: scratch.is_critical(i),
            })
            .collect();

        CriticalPathResult {
            project_finish,
            timings,
        }
    }
}

/// Deterministic durations: planned, else baseline, else one day.
pub fn planned_durations(activities: &[Activity]) -> Vec<f64> {
    activities
        .iter()
        .map(Activity::planned_or_baseline_duration)
        .collect()
}

#[cfg(test)]
#[path = "critical_path_test.rs"]
mod tests;
