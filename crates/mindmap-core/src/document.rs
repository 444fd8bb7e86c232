//! Export/import document: JSON text and `mindmap.json` files

use std::path::{Path, PathBuf};

use crate::error::{DiagramError, Result};
use crate::model::Diagram;

/// Suggested file name for exported diagrams.
pub const DEFAULT_FILE_NAME: &str = "mindmap.json";

/// Default export path inside `dir`.
pub fn default_document_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_FILE_NAME)
}

/// Serialize a diagram as pretty-printed JSON.
pub fn to_document(diagram: &Diagram) -> Result<String> {
    serde_json::to_string_pretty(diagram).map_err(DiagramError::Serialize)
}

/// Parse a document. Fails if the text is not JSON or the `nodes`/`edges`
/// sequences are missing or malformed.
pub fn from_document(text: &str) -> Result<Diagram> {
    serde_json::from_str(text).map_err(DiagramError::Parse)
}

/// Write a diagram to `path`, creating parent directories.
pub fn save_diagram(diagram: &Diagram, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let text = to_document(diagram)?;
    std::fs::write(path, text)?;

    tracing::debug!("Diagram saved: {}", path.display());
    Ok(())
}

/// Read a diagram from `path`.
pub fn load_diagram(path: &Path) -> Result<Diagram> {
    let text = std::fs::read_to_string(path)?;
    let diagram = from_document(&text)?;

    tracing::debug!(
        "Diagram loaded from {}: {} nodes, {} edges",
        path.display(),
        diagram.nodes.len(),
        diagram.edges.len()
    );
    Ok(diagram)
}
