//! Digital twin: the dependency graph of a project's activities.
//!
//! Edges run predecessor → successor. Real schedules are dirty, so neither
//! dangling references nor cycles are errors: dangling predecessors become
//! phantom nodes that carry no activity, and a cyclic graph is flagged and
//! given a best-effort processing order.

use crate::activity::Activity;
use crate::activity_id::ActivityId;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Number of nodes shown in a cycle warning before truncation.
const CYCLE_PREVIEW_LEN: usize = 5;

/// Directed graph of activity dependencies.
#[derive(Debug, Clone)]
pub struct DigitalTwin {
    /// The underlying graph (activity nodes plus phantom nodes)
    graph: DiGraph<ActivityId, ()>,

    /// Map from identifier to node index
    node_map: HashMap<ActivityId, NodeIndex>,

    /// Activities in input order
    activities: Vec<Activity>,

    /// Node of each activity, parallel to `activities`
    activity_nodes: Vec<NodeIndex>,

    /// Activity index of each node; `None` for phantom nodes
    node_activity: Vec<Option<usize>>,

    /// Activity indices in topological (or best-effort) order
    order: Vec<usize>,

    has_cycles: bool,
    cycle_warning: Option<String>,
}

impl DigitalTwin {
    /// Build the twin from a project's activities.
    pub fn build(activities: &[Activity]) -> Self {
        let mut twin = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            activities: Vec::with_capacity(activities.len()),
            activity_nodes: Vec::with_capacity(activities.len()),
            node_activity: Vec::new(),
            order: Vec::new(),
            has_cycles: false,
            cycle_warning: None,
        };

        for activity in activities {
            if twin.node_map.contains_key(activity.id.as_str()) {
                log::warn!("Duplicate activity id '{}' ignored in twin", activity.id);
                continue;
            }
            let idx = twin.add_node(activity.id.clone());
            twin.node_activity[idx.index()] = Some(twin.activities.len());
            twin.activity_nodes.push(idx);
            twin.activities.push(activity.clone());
        }

        for position in 0..twin.activities.len() {
            let target = twin.activity_nodes[position];
            let preds = twin.activities[position].predecessors.clone();
            for pred in preds {
                let Some(pred_id) = ActivityId::try_new(pred) else {
                    continue;
                };
                let source = twin.node_or_phantom(pred_id);
                twin.graph.add_edge(source, target, ());
            }
        }

        twin.resolve_order();
        twin
    }

    fn add_node(&mut self, id: ActivityId) -> NodeIndex {
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id, idx);
        self.node_activity.push(None);
        idx
    }

    fn node_or_phantom(&mut self, id: ActivityId) -> NodeIndex {
        match self.node_map.get(id.as_str()) {
            Some(&idx) => idx,
            None => self.add_node(id),
        }
    }

    /// Determine processing order and cycle status.
    fn resolve_order(&mut self) {
        let node_order = match toposort(&self.graph, None) {
            Ok(order) => order,
            Err(_) => {
                self.has_cycles = true;
                self.cycle_warning = Some(self.describe_cycle());
                log::warn!(
                    "{}",
                    self.cycle_warning.as_deref().unwrap_or("Graph contains cycles")
                );
                self.best_effort_order()
            }
        };

        self.order = node_order
            .into_iter()
            .filter_map(|idx| self.node_activity[idx.index()])
            .collect();
    }

    /// Kahn's algorithm that breaks cycles by releasing the earliest-inserted
    /// blocked node. Edges closing a cycle are effectively ignored by any
    /// pass that only looks at already-placed neighbours.
    fn best_effort_order(&self) -> Vec<NodeIndex> {
        let n = self.graph.node_count();
        let mut in_degree: Vec<usize> = (0..n)
            .map(|i| {
                self.graph
                    .neighbors_directed(NodeIndex::new(i), Direction::Incoming)
                    .count()
            })
            .collect();
        let mut placed = vec![false; n];
        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);

        while order.len() < n {
            let next = ready
                .pop()
                .map(|Reverse(i)| i)
                .or_else(|| (0..n).find(|&i| !placed[i]));
            let Some(next) = next else {
                break;
            };
            if placed[next] {
                continue;
            }
            placed[next] = true;
            let node = NodeIndex::new(next);
            order.push(node);

            for succ in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let s = succ.index();
                if placed[s] {
                    continue;
                }
                in_degree[s] = in_degree[s].saturating_sub(1);
                if in_degree[s] == 0 {
                    ready.push(Reverse(s));
                }
            }
        }

        order
    }

    /// Build the human-readable cycle warning from one concrete cycle.
    fn describe_cycle(&self) -> String {
        match self.find_cycle() {
            Some(cycle) if !cycle.is_empty() => {
                let mut preview = cycle
                    .iter()
                    .take(CYCLE_PREVIEW_LEN)
                    .map(|idx| self.graph[*idx].to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                if cycle.len() > CYCLE_PREVIEW_LEN {
                    preview.push_str("...");
                }
                format!(
                    "Graph contains cycles (e.g., {}). Critical path calculations may be approximate.",
                    preview
                )
            }
            _ => "Graph contains cycles. Critical path calculations may be approximate.".to_string(),
        }
    }

    /// Find one concrete cycle, starting from the earliest-inserted node of
    /// the first non-trivial strongly connected component.
    fn find_cycle(&self) -> Option<Vec<NodeIndex>> {
        let component = tarjan_scc(&self.graph).into_iter().find(|scc| {
            scc.len() > 1 || scc.iter().any(|&n| self.graph.contains_edge(n, n))
        })?;
        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let start = component.iter().copied().min()?;

        let mut path = vec![start];
        let mut position: HashMap<NodeIndex, usize> = HashMap::new();
        position.insert(start, 0);
        let mut current = start;

        loop {
            let next = self
                .graph
                .neighbors_directed(current, Direction::Outgoing)
                .filter(|n| members.contains(n))
                .min()?;
            if let Some(&at) = position.get(&next) {
                return Some(path[at..].to_vec());
            }
            position.insert(next, path.len());
            path.push(next);
            current = next;
        }
    }

    /// Activities in input order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Number of activities (phantom nodes excluded).
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether the twin holds no activities.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Look up an activity by id.
    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.index_of(id).map(|i| &self.activities[i])
    }

    /// Position of an activity in [`activities`](Self::activities).
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_map
            .get(id)
            .and_then(|idx| self.node_activity[idx.index()])
    }

    /// Check if an identifier is a node in the graph (activity or phantom).
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn has_cycles(&self) -> bool {
        self.has_cycles
    }

    pub fn cycle_warning(&self) -> Option<&str> {
        self.cycle_warning.as_deref()
    }

    /// Activity indices in topological order, or best-effort order when the
    /// graph is cyclic.
    pub fn processing_order(&self) -> &[usize] {
        &self.order
    }

    /// Activity indices of the direct predecessors of activity `index`.
    pub fn predecessor_indices(&self, index: usize) -> Vec<usize> {
        self.neighbour_indices(index, Direction::Incoming)
    }

    /// Activity indices of the direct successors of activity `index`.
    pub fn successor_indices(&self, index: usize) -> Vec<usize> {
        self.neighbour_indices(index, Direction::Outgoing)
    }

    fn neighbour_indices(&self, index: usize, direction: Direction) -> Vec<usize> {
        let Some(&node) = self.activity_nodes.get(index) else {
            return Vec::new();
        };
        let mut result: Vec<usize> = self
            .graph
            .neighbors_directed(node, direction)
            .filter_map(|n| self.node_activity[n.index()])
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Direct predecessor ids of a node, phantom nodes included.
    pub fn predecessors(&self, id: &str) -> Vec<String> {
        self.neighbour_ids(id, Direction::Incoming)
    }

    /// Direct successor ids of a node, phantom nodes included.
    pub fn successors(&self, id: &str) -> Vec<String> {
        self.neighbour_ids(id, Direction::Outgoing)
    }

    fn neighbour_ids(&self, id: &str, direction: Direction) -> Vec<String> {
        match self.node_map.get(id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of incoming edges of a node.
    pub fn in_degree(&self, id: &str) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Number of outgoing edges of a node.
    pub fn out_degree(&self, id: &str) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    fn degree(&self, id: &str, direction: Direction) -> usize {
        self.node_map
            .get(id)
            .map(|&idx| self.graph.neighbors_directed(idx, direction).count())
            .unwrap_or(0)
    }

    /// The underlying graph, for graph-global analyses.
    pub fn graph(&self) -> &DiGraph<ActivityId, ()> {
        &self.graph
    }

    /// Activity index for a graph node, `None` for phantom nodes.
    pub fn activity_index_of_node(&self, node: NodeIndex) -> Option<usize> {
        self.node_activity.get(node.index()).copied().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
#[path = "twin_test.rs"]
mod tests;
