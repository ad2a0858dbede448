//! Monte Carlo completion forecast.
//!
//! Every run draws one duration per activity, runs a single CPM pass over
//! the draws, and records the project finish plus the activities that sat
//! on the critical path. Runs are independent: each seeds its own `StdRng`
//! from `seed + run_index`, so the sample is identical whether runs are
//! spread across the rayon pool or executed in sequence.

use crate::explain::ForecastExplanation;
use crate::pipeline::ForensicInsights;
use crate::sampling::DurationDraw;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rl_analysis::SimulationParameters;
use rl_core::{ActivityId, CriticalPathEngine, DigitalTwin, ForecastConfig, Scratch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Default number of ids listed in a warning.
const DEFAULT_MAX_LISTED_IDS: usize = 5;

/// Aggregated forecast over all simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub p50: i64,
    pub p80: i64,
    pub p90: i64,
    pub p95: i64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Duration-weighted percent complete, 0–100
    pub current_progress_pct: f64,
    /// Share of runs in which each activity was critical
    pub criticality_indices: BTreeMap<ActivityId, f64>,
    pub num_simulations: usize,
    pub forensic_modulation_applied: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensic_insights: Option<ForensicInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ForecastExplanation>,
}

impl ForecastResult {
    /// Criticality index of one activity; 0 when unknown.
    pub fn criticality(&self, id: &str) -> f64 {
        self.criticality_indices.get(id).copied().unwrap_or(0.0)
    }

    /// Activities ordered by criticality, highest first (ties by id).
    pub fn most_critical(&self, limit: usize) -> Vec<(&ActivityId, f64)> {
        let mut ranked: Vec<(&ActivityId, f64)> = self
            .criticality_indices
            .iter()
            .map(|(id, ci)| (id, *ci))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

/// Forecaster bound to one twin.
///
/// The CPM index arena is built once in [`new`](Self::new) and shared
/// read-only by every run.
#[derive(Debug, Clone)]
pub struct MonteCarloForecaster<'a> {
    twin: &'a DigitalTwin,
    engine: CriticalPathEngine,
    simulations: usize,
    seed: Option<u64>,
    parallel: bool,
    max_listed_ids: usize,
}

impl<'a> MonteCarloForecaster<'a> {
    pub fn new(twin: &'a DigitalTwin, config: &ForecastConfig) -> Self {
        Self {
            twin,
            engine: CriticalPathEngine::new(twin),
            simulations: config.simulations.max(1),
            seed: config.seed,
            parallel: config.parallel,
            max_listed_ids: DEFAULT_MAX_LISTED_IDS,
        }
    }

    /// Override the run count (mitigation uses smaller budgets).
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations.max(1);
        self
    }

    /// Cap on ids listed in a warning before "(+N more)".
    pub fn with_max_listed_ids(mut self, max_listed_ids: usize) -> Self {
        self.max_listed_ids = max_listed_ids.max(1);
        self
    }

    /// Run the forecast.
    ///
    /// With `params` the forensic distribution shape is used for every
    /// activity that has an entry; activities without one, and every
    /// activity when `params` is `None`, use the standard shape.
    pub fn forecast(
        &self,
        params: Option<&BTreeMap<ActivityId, SimulationParameters>>,
    ) -> ForecastResult {
        let started = Instant::now();
        let activities = self.twin.activities();
        let mut warnings = Vec::new();

        let missing: Vec<&str> = activities
            .iter()
            .filter(|a| !a.has_valid_duration())
            .map(|a| a.id.as_str())
            .collect();
        if !missing.is_empty() {
            let msg = format!(
                "Using default duration of 1.0 day for {} activities with missing or zero duration: {}",
                missing.len(),
                list_ids(&missing, self.max_listed_ids)
            );
            log::warn!("{}", msg);
            warnings.push(msg);
        }
        if let Some(cycle) = self.twin.cycle_warning() {
            warnings.push(cycle.to_string());
        }

        let forensic = params.is_some();
        if activities.is_empty() {
            return ForecastResult {
                p50: 0,
                p80: 0,
                p90: 0,
                p95: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                current_progress_pct: 0.0,
                criticality_indices: BTreeMap::new(),
                num_simulations: self.simulations,
                forensic_modulation_applied: forensic,
                warnings,
                forensic_insights: None,
                explanation: None,
            };
        }

        let draws: Vec<DurationDraw> = activities
            .iter()
            .map(|a| match params.and_then(|p| p.get(a.id.as_str())) {
                Some(p) => DurationDraw::forensic(p),
                None => DurationDraw::standard(a.base_duration(), a.expected_delay_days()),
            })
            .collect();

        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let tally = self.simulate(&draws, seed);

        let runs = self.simulations as f64;
        let mut finishes = tally.finishes;
        finishes.sort_by(f64::total_cmp);

        let mean = finishes.iter().sum::<f64>() / runs;
        let variance = finishes.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / runs;

        let criticality_indices = activities
            .iter()
            .zip(&tally.critical_counts)
            .map(|(a, &count)| (a.id.clone(), count as f64 / runs))
            .collect();

        log::debug!(
            "Forecast: {} runs over {} activities in {:?} (forensic: {})",
            self.simulations,
            activities.len(),
            started.elapsed(),
            forensic
        );

        ForecastResult {
            p50: percentile(&finishes, 50.0).floor() as i64,
            p80: percentile(&finishes, 80.0).floor() as i64,
            p90: percentile(&finishes, 90.0).floor() as i64,
            p95: percentile(&finishes, 95.0).floor() as i64,
            mean,
            std: variance.sqrt(),
            min: finishes.first().copied().unwrap_or(0.0),
            max: finishes.last().copied().unwrap_or(0.0),
            current_progress_pct: current_progress_pct(self.twin),
            criticality_indices,
            num_simulations: self.simulations,
            forensic_modulation_applied: forensic,
            warnings,
            forensic_insights: None,
            explanation: None,
        }
    }

    fn simulate(&self, draws: &[DurationDraw], seed: u64) -> RunTally {
        let n = draws.len();
        let runs = 0..self.simulations;
        if self.parallel {
            runs.into_par_iter()
                .fold(
                    || Worker::new(n),
                    |mut worker, run| {
                        worker.run(&self.engine, draws, seed, run);
                        worker
                    },
                )
                .map(Worker::into_tally)
                .reduce(|| RunTally::new(n), RunTally::merge)
        } else {
            let mut worker = Worker::new(n);
            for run in runs {
                worker.run(&self.engine, draws, seed, run);
            }
            worker.into_tally()
        }
    }
}

/// Per-worker buffers and partial results.
struct Worker {
    durations: Vec<f64>,
    scratch: Scratch,
    tally: RunTally,
}

impl Worker {
    fn new(n: usize) -> Self {
        Self {
            durations: vec![0.0; n],
            scratch: Scratch::with_len(n),
            tally: RunTally::new(n),
        }
    }

    fn run(&mut self, engine: &CriticalPathEngine, draws: &[DurationDraw], seed: u64, run: usize) {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(run as u64));
        for (slot, draw) in self.durations.iter_mut().zip(draws) {
            *slot = draw.sample(&mut rng);
        }

        let finish = engine.compute_into(&self.durations, &mut self.scratch);
        self.tally.finishes.push(finish);
        for (i, count) in self.tally.critical_counts.iter_mut().enumerate() {
            if self.scratch.is_critical(i) {
                *count += 1;
            }
        }
    }

    fn into_tally(self) -> RunTally {
        self.tally
    }
}

/// Project finishes and criticality counts of a set of runs.
struct RunTally {
    finishes: Vec<f64>,
    critical_counts: Vec<u64>,
}

impl RunTally {
    fn new(n: usize) -> Self {
        Self {
            finishes: Vec::new(),
            critical_counts: vec![0; n],
        }
    }

    fn merge(mut self, other: RunTally) -> RunTally {
        self.finishes.extend(other.finishes);
        for (mine, theirs) in self.critical_counts.iter_mut().zip(other.critical_counts) {
            *mine += theirs;
        }
        self
    }
}

/// Percentile with linear interpolation between order statistics.
///
/// `sorted` must be ascending. An empty sample yields 0.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Percent complete weighted by planned (else baseline, else one day)
/// duration, in 0–100.
pub fn current_progress_pct(twin: &DigitalTwin) -> f64 {
    let (weighted, total) = twin
        .activities()
        .iter()
        .fold((0.0, 0.0), |(weighted, total), a| {
            let weight = a.planned_or_baseline_duration();
            (weighted + a.percent_complete / 100.0 * weight, total + weight)
        });
    if total > 0.0 {
        (weighted / total).clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    }
}

/// Join ids for a warning, summarizing the tail as "(+N more)".
pub fn list_ids(ids: &[&str], max_listed: usize) -> String {
    let shown = ids.iter().take(max_listed).copied().collect::<Vec<_>>().join(", ");
    if ids.len() > max_listed {
        format!("{} (+{} more)", shown, ids.len() - max_listed)
    } else {
        shown
    }
}

#[cfg(test)]
#[path = "monte_carlo_test.rs"]
mod tests;
