//! Risk archetype clustering.
//!
//! Activities are grouped with k-means over a five-dimensional vector
//! `[float_days, fte_ratio, drift_ratio, cost_variance, dependency_count]`,
//! standardized per column. Each cluster id maps to a fixed
//! [`RiskArchetype`] that later shapes the simulation. Clustering is an
//! enrichment: any numerical trouble degrades to archetype 0 for everyone
//! with a warning, never an error.

use crate::error::{AnalysisError, AnalysisResult};
use crate::features::ActivityFeatures;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rl_core::{ActivityId, ClusteringConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clustering dimensions.
pub const CLUSTER_DIMS: usize = 5;

type Point = [f64; CLUSTER_DIMS];

/// Named risk archetypes, indexed by cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchetypeKind {
    /// Low risk
    Stable,
    /// Medium risk
    Watch,
    /// High risk
    Burnout,
    /// Very high risk
    Failure,
}

/// Simulation shaping attached to a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskArchetype {
    pub kind: ArchetypeKind,
    pub failure_probability: f64,
    pub variance_multiplier: f64,
    pub mode_shift_factor: f64,
}

impl RiskArchetype {
    /// Fixed archetype table. Unknown ids fall back to the stable archetype.
    pub fn for_cluster(cluster_id: usize) -> Self {
        let (kind, failure_probability, variance_multiplier, mode_shift_factor) = match cluster_id {
            1 => (ArchetypeKind::Watch, 0.15, 1.2, 0.1),
            2 => (ArchetypeKind::Burnout, 0.30, 1.5, 0.2),
            3 => (ArchetypeKind::Failure, 0.50, 2.0, 0.3),
            _ => (ArchetypeKind::Stable, 0.05, 1.0, 0.0),
        };
        Self {
            kind,
            failure_probability,
            variance_multiplier,
            mode_shift_factor,
        }
    }

    /// Cluster id this archetype belongs to.
    pub fn cluster_id(&self) -> usize {
        match self.kind {
            ArchetypeKind::Stable => 0,
            ArchetypeKind::Watch => 1,
            ArchetypeKind::Burnout => 2,
            ArchetypeKind::Failure => 3,
        }
    }
}

impl Default for RiskArchetype {
    fn default() -> Self {
        Self::for_cluster(0)
    }
}

/// One activity's clustering vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInput {
    pub activity_id: ActivityId,
    pub vector: Point,
}

impl ClusterInput {
    pub fn from_features(activity_id: ActivityId, features: &ActivityFeatures) -> Self {
        let cost_variance = features.cost.map(|c| c.cost_variance).unwrap_or(0.0);
        Self {
            activity_id,
            vector: [
                features.float_days,
                features.fte_ratio,
                features.drift.drift_ratio,
                cost_variance,
                (features.predecessor_count + features.successor_count) as f64,
            ],
        }
    }
}

/// Cluster assignments for a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    pub assignments: BTreeMap<ActivityId, usize>,
    /// Set when clustering degraded to archetype 0 for everyone
    pub warning: Option<String>,
}

impl Clustering {
    /// Cluster of an activity; 0 when unknown.
    pub fn cluster_of(&self, id: &str) -> usize {
        self.assignments.get(id).copied().unwrap_or(0)
    }

    pub fn archetype_of(&self, id: &str) -> RiskArchetype {
        RiskArchetype::for_cluster(self.cluster_of(id))
    }

    fn all_zero(inputs: &[ClusterInput], warning: Option<String>) -> Self {
        Self {
            assignments: inputs.iter().map(|i| (i.activity_id.clone(), 0)).collect(),
            warning,
        }
    }
}

/// Assign every input to a risk cluster.
///
/// Fewer inputs than `k` puts everyone in cluster 0.
pub fn cluster(inputs: &[ClusterInput], config: &ClusteringConfig) -> Clustering {
    if inputs.len() < config.k {
        return Clustering::all_zero(inputs, None);
    }

    match fit(inputs, config) {
        Ok(labels) => Clustering {
            assignments: inputs
                .iter()
                .zip(labels)
                .map(|(input, label)| (input.activity_id.clone(), label))
                .collect(),
            warning: None,
        },
        Err(e) => {
            let message = format!("Risk clustering unavailable, using stable archetype: {}", e);
            log::warn!("{}", message);
            Clustering::all_zero(inputs, Some(message))
        }
    }
}

fn fit(inputs: &[ClusterInput], config: &ClusteringConfig) -> AnalysisResult<Vec<usize>> {
    if let Some(bad) = inputs.iter().find(|i| i.vector.iter().any(|v| !v.is_finite())) {
        return Err(AnalysisError::NonFiniteInput {
            activity_id: bad.activity_id.to_string(),
        });
    }

    let points: Vec<Point> = inputs.iter().map(|i| i.vector).collect();
    let (scaled, mean_variance) = standardize(&points);
    let tolerance = config.tolerance * mean_variance;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansRun> = None;
    for _ in 0..config.n_init {
        let run = lloyd(&scaled, config.k, config.max_iter, tolerance, &mut rng);
        if !run.inertia.is_finite() {
            continue;
        }
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    let best = best.ok_or_else(|| AnalysisError::ClusteringFailed {
        message: "no k-means restart produced a finite inertia".to_string(),
    })?;
    if !best.converged {
        return Err(AnalysisError::ClusteringFailed {
            message: format!("k-means did not converge within {} iterations", config.max_iter),
        });
    }
    log::debug!(
        "k-means converged: k={}, inertia={:.4}, {} points",
        config.k,
        best.inertia,
        scaled.len()
    );
    Ok(best.labels)
}

/// Zero-mean, unit-variance columns (population std). Constant columns are
/// centred but not scaled. Also returns the mean column variance of the
/// scaled data, used to make the convergence tolerance scale-free.
fn standardize(points: &[Point]) -> (Vec<Point>, f64) {
    let n = points.len() as f64;
    let mut mean = [0.0; CLUSTER_DIMS];
    for p in points {
        for d in 0..CLUSTER_DIMS {
            mean[d] += p[d] / n;
        }
    }
    let mut std = [0.0; CLUSTER_DIMS];
    for p in points {
        for d in 0..CLUSTER_DIMS {
            std[d] += (p[d] - mean[d]).powi(2) / n;
        }
    }
    let mut scaled_variance = 0.0;
    for s in std.iter_mut() {
        *s = s.sqrt();
        if *s == 0.0 {
            *s = 1.0;
        } else {
            scaled_variance += 1.0;
        }
    }

    let scaled = points
        .iter()
        .map(|p| {
            let mut out = [0.0; CLUSTER_DIMS];
            for d in 0..CLUSTER_DIMS {
                out[d] = (p[d] - mean[d]) / std[d];
            }
            out
        })
        .collect();
    (scaled, scaled_variance / CLUSTER_DIMS as f64)
}

struct KMeansRun {
    labels: Vec<usize>,
    inertia: f64,
    converged: bool,
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &Point, centers: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centers.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++ seeding: each new centre is drawn with probability
/// proportional to its squared distance from the nearest existing one.
fn kmeans_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = closest.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = points.len() - 1;
            for (i, d) in closest.iter().enumerate() {
                if target < *d {
                    pick = i;
                    break;
                }
                target -= d;
            }
            pick
        } else {
            // fewer distinct points than clusters
            rng.gen_range(0..points.len())
        };
        let center = points[chosen];
        for (i, p) in points.iter().enumerate() {
            closest[i] = closest[i].min(squared_distance(p, &center));
        }
        centers.push(center);
    }
    centers
}

fn lloyd(points: &[Point], k: usize, max_iter: usize, tolerance: f64, rng: &mut StdRng) -> KMeansRun {
    let mut centers = kmeans_plus_plus(points, k, rng);
    let mut labels = vec![0usize; points.len()];
    let mut converged = false;

    for _ in 0..max_iter {
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest(p, &centers).0;
        }

        let mut sums = vec![[0.0; CLUSTER_DIMS]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for d in 0..CLUSTER_DIMS {
                sums[label][d] += p[d];
            }
        }

        let mut shift = 0.0;
        for c in 0..k {
            // empty clusters keep their previous centre
            if counts[c] == 0 {
                continue;
            }
            let mut updated = [0.0; CLUSTER_DIMS];
            for d in 0..CLUSTER_DIMS {
                updated[d] = sums[c][d] / counts[c] as f64;
            }
            shift += squared_distance(&centers[c], &updated);
            centers[c] = updated;
        }

        if shift <= tolerance {
            converged = true;
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, p) in labels.iter_mut().zip(points) {
        let (c, d) = nearest(p, &centers);
        *label = c;
        inertia += d;
    }

    KMeansRun {
        labels,
        inertia,
        converged,
    }
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;
