//! Graph centrality: which activities are bridges in the network.
//!
//! Both centralities are computed over the whole twin graph (phantom nodes
//! included, parallel edges collapsed) and reported for activities only.
//! Computation happens once per request; the resulting [`TopologyMetrics`]
//! is shared read-only by every simulation run.

use rl_core::{ActivityId, DigitalTwin, TopologyConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Weight of betweenness in the combined centrality.
const BETWEENNESS_WEIGHT: f64 = 0.7;

/// Weight of eigenvector centrality in the combined centrality.
const EIGENVECTOR_WEIGHT: f64 = 0.3;

/// Extra variance per unit of combined centrality.
const CENTRALITY_VARIANCE: f64 = 0.5;

/// Centrality of one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopologyScore {
    pub betweenness: f64,
    pub eigenvector: f64,
    /// `1 + 0.5 * (0.7 * betweenness + 0.3 * eigenvector)`
    pub variance_multiplier: f64,
}

impl TopologyScore {
    pub fn new(betweenness: f64, eigenvector: f64) -> Self {
        let combined = BETWEENNESS_WEIGHT * betweenness + EIGENVECTOR_WEIGHT * eigenvector;
        Self {
            betweenness,
            eigenvector,
            variance_multiplier: 1.0 + combined * CENTRALITY_VARIANCE,
        }
    }
}

/// Centrality scores for every activity of a twin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub scores: BTreeMap<ActivityId, TopologyScore>,
}

impl TopologyMetrics {
    pub fn compute(twin: &DigitalTwin, config: &TopologyConfig) -> Self {
        if twin.is_empty() {
            return Self::default();
        }
        let adjacency = simple_adjacency(twin);
        let betweenness = betweenness_centrality(&adjacency);
        let eigenvector = eigenvector_centrality(
            &adjacency,
            config.eigenvector_max_iter,
            config.eigenvector_tolerance,
        )
        .unwrap_or_else(|| {
            log::warn!("Eigenvector centrality did not converge; using zero scores");
            vec![0.0; adjacency.len()]
        });

        let scores = twin
            .graph()
            .node_indices()
            .filter(|node| twin.activity_index_of_node(*node).is_some())
            .map(|node| {
                let i = node.index();
                (
                    twin.graph()[node].clone(),
                    TopologyScore::new(betweenness[i], eigenvector[i]),
                )
            })
            .collect();

        Self { scores }
    }

    pub fn get(&self, id: &str) -> Option<&TopologyScore> {
        self.scores.get(id)
    }

    /// Variance multiplier for an activity; 1.0 when unknown.
    pub fn variance_for(&self, id: &str) -> f64 {
        self.get(id).map(|s| s.variance_multiplier).unwrap_or(1.0)
    }
}

/// Successor lists by node index, without duplicate edges.
fn simple_adjacency(twin: &DigitalTwin) -> Vec<Vec<usize>> {
    let graph = twin.graph();
    graph
        .node_indices()
        .map(|node| {
            let mut succ: Vec<usize> = graph.neighbors(node).map(|n| n.index()).collect();
            succ.sort_unstable();
            succ.dedup();
            succ
        })
        .collect()
}

/// Brandes betweenness for a directed, unweighted graph, normalized by
/// `1 / ((n - 1)(n - 2))` when `n > 2`.
pub fn betweenness_centrality(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::with_capacity(n);

    for s in 0..n {
        stack.clear();
        for p in preds.iter_mut() {
            p.clear();
        }
        sigma.fill(0.0);
        dist.fill(-1);
        delta.fill(0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adjacency[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for c in centrality.iter_mut() {
            *c *= scale;
        }
    }
    centrality
}

/// Eigenvector centrality by power iteration on `A + I`, where each node
/// accumulates the scores of its predecessors.
///
/// Returns `None` when the iteration fails to converge within `max_iter`
/// steps, when the graph is empty, or when the vector collapses to zero.
pub fn eigenvector_centrality(
    adjacency: &[Vec<usize>],
    max_iter: usize,
    tolerance: f64,
) -> Option<Vec<f64>> {
    let n = adjacency.len();
    if n == 0 {
        return None;
    }

    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..max_iter {
        let last = x.clone();
        for (node, successors) in adjacency.iter().enumerate() {
            for &succ in successors {
                x[succ] += last[node];
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        for v in x.iter_mut() {
            *v /= norm;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tolerance {
            return Some(x);
        }
    }
    None
}

#[cfg(test)]
#[path = "topology_test.rs"]
mod tests;
