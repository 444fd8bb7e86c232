//! Structural summary of a diagram

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::model::{Diagram, EdgeId, NodeId};

/// Counts and anomalies worth reporting for a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Nodes without an incoming edge, in document order.
    pub roots: Vec<NodeId>,
    /// Weakly connected components.
    pub components: usize,
    pub self_loops: usize,
    /// Edges repeating an earlier (source, target) pair.
    pub parallel_edges: usize,
    /// Edges whose source or target is not a node of the diagram.
    pub dangling_edges: Vec<EdgeId>,
    pub duplicate_node_ids: Vec<NodeId>,
    pub duplicate_edge_ids: Vec<EdgeId>,
    pub has_cycle: bool,
}

impl DiagramSummary {
    /// True when the diagram breaks none of the store's invariants.
    pub fn is_consistent(&self) -> bool {
        self.dangling_edges.is_empty()
            && self.duplicate_node_ids.is_empty()
            && self.duplicate_edge_ids.is_empty()
    }
}

/// Build a summary of `diagram`.
pub fn summarize(diagram: &Diagram) -> DiagramSummary {
    let mut graph: DiGraph<&NodeId, &EdgeId> = DiGraph::new();
    let mut index: HashMap<&NodeId, NodeIndex> = HashMap::new();
    let mut duplicate_node_ids = Vec::new();

    for node in &diagram.nodes {
        if index.contains_key(&node.id) {
            duplicate_node_ids.push(node.id.clone());
            continue;
        }
        index.insert(&node.id, graph.add_node(&node.id));
    }

    let mut seen_edge_ids = HashSet::new();
    let mut seen_pairs = HashSet::new();
    let mut duplicate_edge_ids = Vec::new();
    let mut dangling_edges = Vec::new();
    let mut self_loops = 0;
    let mut parallel_edges = 0;

    for edge in &diagram.edges {
        if !seen_edge_ids.insert(&edge.id) {
            duplicate_edge_ids.push(edge.id.clone());
        }
        let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
        else {
            dangling_edges.push(edge.id.clone());
            continue;
        };
        if source == target {
            self_loops += 1;
        }
        if !seen_pairs.insert((source, target)) {
            parallel_edges += 1;
        }
        graph.add_edge(source, target, &edge.id);
    }

    let roots = graph
        .node_indices()
        .filter(|&idx| {
            graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
        .map(|idx| graph[idx].clone())
        .collect();

    DiagramSummary {
        node_count: diagram.nodes.len(),
        edge_count: diagram.edges.len(),
        roots,
        components: connected_components(&graph),
        self_loops,
        parallel_edges,
        dangling_edges,
        duplicate_node_ids,
        duplicate_edge_ids,
        has_cycle: is_cyclic_directed(&graph),
    }
}
