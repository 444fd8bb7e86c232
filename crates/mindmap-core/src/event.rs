//! Renderer → store events and their application

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diff::GraphDiff;
use crate::graph::GraphStore;
use crate::model::{EdgeId, NodeId, Position};

/// Interactions reported by the renderer plus the two toolbar commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Single click on a node.
    Selected { id: NodeId },
    /// Drag-to-connect gesture ended on another node.
    Connected { source: NodeId, target: NodeId },
    /// Inline edit finished.
    LabelCommitted { id: NodeId, text: String },
    /// Node drag finished.
    NodeMoved { id: NodeId, position: Position },
    /// Edge deleted in the renderer.
    EdgeRemoved { id: EdgeId },
    AddChild,
    DeleteSelected,
}

impl<R: Rng> GraphStore<R> {
    /// Apply one event and describe what changed.
    ///
    /// Ignored events produce an empty diff that reuses the current
    /// sequence number; every non-empty diff gets the next one.
    pub fn apply(&mut self, event: EditorEvent) -> GraphDiff {
        debug!("Applying event: {:?}", event);
        let before = self.selected().cloned();
        let mut diff = GraphDiff::new(self.sequence());

        match event {
            EditorEvent::Selected { id } => {
                self.select(id);
            }
            EditorEvent::Connected { source, target } => {
                diff.added_edges.push(self.connect(source, target));
            }
            EditorEvent::LabelCommitted { id, text } => {
                if let Some(edit) = self.update_label(&id, &text) {
                    diff.modified_nodes.push(edit.node().clone());
                }
            }
            EditorEvent::NodeMoved { id, position } => {
                if let Some(node) = self.move_node(&id, position) {
                    diff.modified_nodes.push(node);
                }
            }
            EditorEvent::EdgeRemoved { id } => {
                if let Some(edge) = self.remove_edge(&id) {
                    diff.removed_edges.push(edge.id);
                }
            }
            EditorEvent::AddChild => {
                if let Some((node, edge)) = self.add_child() {
                    diff.added_nodes.push(node);
                    diff.added_edges.push(edge);
                }
            }
            EditorEvent::DeleteSelected => {
                if let Some(removal) = self.delete_selected() {
                    diff.removed_nodes.push(removal.node.id);
                    diff.removed_edges.extend(removal.edges.into_iter().map(|e| e.id));
                }
            }
        }

        diff.selected = self.selected().cloned();
        diff.selection_changed = diff.selected != before;
        if !diff.is_empty() {
            diff.sequence = self.next_sequence();
        }
        diff
    }
}
