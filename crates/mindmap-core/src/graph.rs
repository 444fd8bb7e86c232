//! The graph store: authoritative nodes, edges and selection for one session

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::debug;

use crate::config::EditorConfig;
use crate::document;
use crate::error::Result;
use crate::model::*;

/// Outcome of committing an inline label edit.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelEdit {
    /// The label was replaced.
    Updated(Node),
    /// The text was blank; the previous label stands.
    Reverted(Node),
}

impl LabelEdit {
    pub fn node(&self) -> &Node {
        match self {
            LabelEdit::Updated(node) | LabelEdit::Reverted(node) => node,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, LabelEdit::Updated(_))
    }
}

/// A node removed together with the edges that touched it.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub node: Node,
    pub edges: Vec<Edge>,
}

/// Nodes and edges of one editing session, in creation order.
///
/// The store is generic over its random source so palette draws, jitter and
/// identifiers can be made reproducible with a seeded RNG.
pub struct GraphStore<R = StdRng> {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected: Option<NodeId>,
    config: EditorConfig,
    rng: R,
    sequence: u64,
}

impl<R> std::fmt::Debug for GraphStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl GraphStore<StdRng> {
    /// A session seeded with the configured root node, drawing from OS entropy.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A session over an existing diagram, drawing from OS entropy.
    pub fn with_diagram(config: EditorConfig, diagram: Diagram) -> Self {
        Self::from_diagram(config, diagram, StdRng::from_os_rng())
    }

    /// Like [`GraphStore::new`] but reproducible.
    pub fn seeded(config: EditorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl Default for GraphStore<StdRng> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl<R: Rng> GraphStore<R> {
    pub fn with_rng(config: EditorConfig, rng: R) -> Self {
        let root = config.root_node();
        GraphStore {
            nodes: vec![root],
            edges: Vec::new(),
            selected: None,
            config,
            rng,
            sequence: 0,
        }
    }

    /// A session that starts from an existing diagram instead of the seed node.
    pub fn from_diagram(config: EditorConfig, diagram: Diagram, rng: R) -> Self {
        GraphStore {
            nodes: diagram.nodes,
            edges: diagram.edges,
            selected: None,
            config,
            rng,
            sequence: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == *id)
    }

    /// Edges whose source or target is `id`.
    pub fn incident_edges<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Sequence number of the most recent diff handed out by `apply`.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Record `id` as the selection. The id is not checked against the nodes.
    pub fn select(&mut self, id: NodeId) {
        debug!("Selected node {}", id);
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Connect two nodes with a randomly colored edge.
    ///
    /// Self-loops and parallel edges are accepted.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Edge {
        let color_index = self.config.palette.pick(&mut self.rng);
        self.connect_with_color(source, target, color_index)
    }

    /// [`GraphStore::connect`] with an explicit palette index.
    pub fn connect_with_color(&mut self, source: NodeId, target: NodeId, color_index: usize) -> Edge {
        let id = EdgeId::generate(&mut self.rng);
        let edge = self.colored_edge(id, source, target, color_index);
        debug!("Connected {} -> {} ({})", edge.source, edge.target, edge.id);
        self.edges.push(edge.clone());
        edge
    }

    /// Add an unlabeled child to the selected node.
    ///
    /// Returns `None` when nothing is selected or the selection no longer
    /// names a node.
    pub fn add_child(&mut self) -> Option<(Node, Edge)> {
        let parent = self.selected_parent()?;
        let color_index = self.config.palette.pick(&mut self.rng);
        let jitter = self.draw_jitter();
        Some(self.push_child(parent, color_index, jitter))
    }

    /// [`GraphStore::add_child`] with an explicit palette index and vertical jitter.
    pub fn add_child_with(&mut self, color_index: usize, jitter: f64) -> Option<(Node, Edge)> {
        let parent = self.selected_parent()?;
        Some(self.push_child(parent, color_index, jitter))
    }

    fn selected_parent(&self) -> Option<Node> {
        let parent = self.selected_node().cloned();
        if parent.is_none() {
            debug!("add_child ignored: no selected node");
        }
        parent
    }

    fn push_child(&mut self, parent: Node, color_index: usize, jitter: f64) -> (Node, Edge) {
        let color = self.config.palette.color(color_index).to_string();
        let child_id = NodeId::generate(&mut self.rng);
        let child = Node::new(
            child_id.clone(),
            parent.position.offset(self.config.child_offset, jitter),
            "",
        )
        .with_kind(self.config.node_type.clone())
        .with_color(color);

        let edge_id = EdgeId::generate(&mut self.rng);
        let edge = self.colored_edge(edge_id, parent.id.clone(), child_id, color_index);

        debug!("Added child {} under {}", child.id, parent.id);
        self.nodes.push(child.clone());
        self.edges.push(edge.clone());
        (child, edge)
    }

    /// Remove the selected node and every edge touching it, then clear the
    /// selection.
    ///
    /// Returns `None` when nothing is selected. A selection naming a missing
    /// node is cleared and also yields `None`.
    pub fn delete_selected(&mut self) -> Option<Removal> {
        let Some(id) = self.selected.take() else {
            debug!("delete_selected ignored: no selected node");
            return None;
        };

        let Some(position) = self.nodes.iter().position(|n| n.id == id) else {
            debug!("delete_selected ignored: {} is not in the diagram", id);
            return None;
        };
        let node = self.nodes.remove(position);

        let (removed_edges, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.touches(&id));
        self.edges = kept;
        debug!("Deleted node {} with {} edges", node.id, removed_edges.len());
        Some(Removal {
            node,
            edges: removed_edges,
        })
    }

    /// Commit an inline label edit.
    ///
    /// Blank text keeps the previous label. Returns `None` for unknown ids.
    pub fn update_label(&mut self, id: &NodeId, text: &str) -> Option<LabelEdit> {
        let node = self.nodes.iter_mut().find(|n| n.id == *id)?;
        if text.trim().is_empty() {
            debug!("Blank label for {} reverted", id);
            return Some(LabelEdit::Reverted(node.clone()));
        }
        node.data.label = text.to_string();
        Some(LabelEdit::Updated(node.clone()))
    }

    /// Record a position reported by a finished drag.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Option<Node> {
        let node = self.nodes.iter_mut().find(|n| n.id == *id)?;
        node.position = position;
        Some(node.clone())
    }

    /// Remove a single edge.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let position = self.edges.iter().position(|e| e.id == *id)?;
        Some(self.edges.remove(position))
    }

    /// Snapshot of every node and edge.
    pub fn export_diagram(&self) -> Diagram {
        Diagram::new(self.nodes.clone(), self.edges.clone())
    }

    /// Serialized export document.
    pub fn export_document(&self) -> Result<String> {
        document::to_document(&self.export_diagram())
    }

    /// Replace nodes and edges with the contents of `document`.
    ///
    /// On error nothing changes, selection included.
    pub fn import_diagram(&mut self, document: &str) -> Result<()> {
        let diagram = document::from_document(document)?;
        self.replace_diagram(diagram);
        Ok(())
    }

    /// Wholesale replacement with an already parsed diagram.
    ///
    /// The selection survives only if its node is still present.
    pub fn replace_diagram(&mut self, diagram: Diagram) {
        debug!(
            "Replacing diagram: {} nodes, {} edges",
            diagram.nodes.len(),
            diagram.edges.len()
        );
        self.nodes = diagram.nodes;
        self.edges = diagram.edges;
        if let Some(id) = &self.selected {
            if !self.nodes.iter().any(|n| n.id == *id) {
                self.selected = None;
            }
        }
    }

    fn selected_node(&self) -> Option<&Node> {
        self.selected.as_ref().and_then(|id| self.node(id))
    }

    fn draw_jitter(&mut self) -> f64 {
        let half = self.config.jitter;
        if half > 0.0 {
            self.rng.random_range(-half..half)
        } else {
            0.0
        }
    }

    fn colored_edge(&self, id: EdgeId, source: NodeId, target: NodeId, color_index: usize) -> Edge {
        let color = self.config.palette.color(color_index);
        let mut edge = Edge::new(id, source, target);
        edge.data = Some(EdgeData {
            color: Some(color.to_string()),
        });
        edge.style = Some(json!({
            "stroke": color,
            "strokeWidth": self.config.edge_stroke_width,
        }));
        edge
    }
}
