//! Graph diffs broadcast to renderers after each event

use crate::model::*;
use serde::{Deserialize, Serialize};

/// Represents a change to the diagram that should be broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDiff {
    /// Monotonically increasing diff sequence number.
    pub sequence: u64,
    /// Nodes added in this update.
    pub added_nodes: Vec<Node>,
    /// Nodes removed in this update.
    pub removed_nodes: Vec<NodeId>,
    /// Edges added in this update.
    pub added_edges: Vec<Edge>,
    /// Edges removed in this update.
    pub removed_edges: Vec<EdgeId>,
    /// Nodes whose label or position changed, as they are now.
    pub modified_nodes: Vec<Node>,
    /// Whether the selection changed.
    pub selection_changed: bool,
    /// Selection after the update.
    pub selected: Option<NodeId>,
}

impl GraphDiff {
    /// Create an empty diff with given sequence number.
    pub fn new(sequence: u64) -> Self {
        GraphDiff {
            sequence,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            added_edges: Vec::new(),
            removed_edges: Vec::new(),
            modified_nodes: Vec::new(),
            selection_changed: false,
            selected: None,
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.modified_nodes.is_empty()
            && !self.selection_changed
    }
}
