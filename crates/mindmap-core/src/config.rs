//! Editor configuration loaded from a TOML file

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiagramError, Result};
use crate::model::{Node, NodeId, Position};
use crate::palette::Palette;

/// Horizontal distance between a parent and a new child.
pub const DEFAULT_CHILD_OFFSET: f64 = 250.0;

/// Half-width of the vertical jitter applied to a new child.
pub const DEFAULT_JITTER: f64 = 50.0;

pub const DEFAULT_NODE_TYPE: &str = "mindmap";

pub const DEFAULT_EDGE_STROKE_WIDTH: f64 = 2.0;

/// Tunables for how the store creates nodes and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub palette: Palette,
    pub child_offset: f64,
    pub jitter: f64,
    pub node_type: String,
    pub edge_stroke_width: f64,
    pub root: RootNodeConfig,
}

/// The node every new session starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootNodeConfig {
    pub id: String,
    pub label: String,
    pub color: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            palette: Palette::default(),
            child_offset: DEFAULT_CHILD_OFFSET,
            jitter: DEFAULT_JITTER,
            node_type: DEFAULT_NODE_TYPE.to_string(),
            edge_stroke_width: DEFAULT_EDGE_STROKE_WIDTH,
            root: RootNodeConfig::default(),
        }
    }
}

impl Default for RootNodeConfig {
    fn default() -> Self {
        RootNodeConfig {
            id: "1".to_string(),
            label: "What is a mind map?".to_string(),
            color: Some("#FF8A65".to_string()),
            x: 250.0,
            y: 250.0,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Editor config loaded from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(DiagramError::InvalidConfig(format!(
                "jitter must be a non-negative number, got {}",
                self.jitter
            )));
        }
        if !self.child_offset.is_finite() {
            return Err(DiagramError::InvalidConfig(
                "child_offset must be finite".to_string(),
            ));
        }
        if self.root.id.is_empty() {
            return Err(DiagramError::InvalidConfig(
                "root.id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the seed node for a fresh session.
    pub fn root_node(&self) -> Node {
        let root = &self.root;
        let mut node = Node::new(
            NodeId::new(root.id.clone()),
            Position::new(root.x, root.y),
            root.label.clone(),
        )
        .with_kind(self.node_type.clone());
        node.data.color = root.color.clone();
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EditorConfig::from_toml_str(
            r##"
palette = ["#000000", "#FFFFFF"]
child_offset = 300.0

[root]
id = "root"
label = "Ideas"
"##,
        )
        .unwrap();

        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.child_offset, 300.0);
        assert_eq!(config.jitter, DEFAULT_JITTER);
        assert_eq!(config.root.id, "root");
        assert_eq!(config.root.label, "Ideas");
        assert_eq!(config.root.x, 250.0);
    }

    #[test]
    fn test_empty_palette_is_rejected() {
        let err = EditorConfig::from_toml_str("palette = []").unwrap_err();
        assert!(matches!(err, DiagramError::Config(_)));
    }

    #[test]
    fn test_negative_jitter_is_rejected() {
        let err = EditorConfig::from_toml_str("jitter = -1.0").unwrap_err();
        assert!(matches!(err, DiagramError::InvalidConfig(_)));
    }

    #[test]
    fn test_root_node_uses_config() {
        let node = EditorConfig::default().root_node();
        assert_eq!(node.id, NodeId::new("1"));
        assert_eq!(node.kind.as_deref(), Some("mindmap"));
        assert_eq!(node.color(), Some("#FF8A65"));
        assert_eq!(node.position, Position::new(250.0, 250.0));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mindmap.toml");
        std::fs::write(&path, "jitter = 0.0\n").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.jitter, 0.0);
    }
}
