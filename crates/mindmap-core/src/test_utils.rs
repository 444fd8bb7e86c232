//! Test utilities for the graph store

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EditorConfig;
use crate::graph::GraphStore;
use crate::model::{Diagram, Edge, EdgeId, Node, NodeId, Position};

/// Config whose seed node is `id`, labeled `id`, at (250, 250).
pub fn config_with_root(id: &str) -> EditorConfig {
    let mut config = EditorConfig::default();
    config.root.id = id.to_string();
    config.root.label = id.to_string();
    config
}

/// A store holding only the node `id`, with a fixed seed.
pub fn store_with_root(id: &str) -> GraphStore {
    store_with_root_seeded(id, 0)
}

pub fn store_with_root_seeded(id: &str, seed: u64) -> GraphStore {
    GraphStore::with_rng(config_with_root(id), StdRng::seed_from_u64(seed))
}

/// A hand-built diagram: a chain of nodes linked in order.
pub fn chain_diagram(ids: &[&str]) -> Diagram {
    let nodes = ids
        .iter()
        .enumerate()
        .map(|(i, id)| Node::new(NodeId::new(*id), Position::new(i as f64 * 250.0, 0.0), *id))
        .collect();
    let edges = ids
        .windows(2)
        .map(|pair| {
            Edge::new(
                EdgeId::new(format!("{}-{}", pair[0], pair[1])),
                NodeId::new(pair[0]),
                NodeId::new(pair[1]),
            )
        })
        .collect();
    Diagram::new(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_diagram() {
        let diagram = chain_diagram(&["a", "b", "c"]);
        assert_eq!(diagram.nodes.len(), 3);
        assert_eq!(diagram.edges.len(), 2);
        assert_eq!(diagram.edges[1].source, NodeId::new("b"));
    }

    #[test]
    fn test_store_with_root() {
        let store = store_with_root("root");
        assert_eq!(store.nodes()[0].label(), "root");
        assert_eq!(store.nodes()[0].position, Position::new(250.0, 250.0));
    }
}
