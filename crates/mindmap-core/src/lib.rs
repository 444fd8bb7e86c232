//! Mindmap Core — diagram model, graph store, editor events and document I/O

pub mod model;
pub mod error;
pub mod palette;
pub mod config;
pub mod graph;
pub mod event;
pub mod diff;
pub mod document;
pub mod analysis;


#[cfg(test)]
pub mod test_utils;

pub use model::{NodeId, EdgeId, Position, NodeData, EdgeData, Node, Edge, Diagram};
pub use error::DiagramError;
pub use palette::{Palette, DEFAULT_COLORS};
pub use config::{EditorConfig, RootNodeConfig};
pub use graph::{GraphStore, LabelEdit, Removal};
pub use event::EditorEvent;
pub use diff::GraphDiff;
pub use document::{DEFAULT_FILE_NAME, default_document_path, to_document, from_document, save_diagram, load_diagram};
pub use analysis::{DiagramSummary, summarize};
