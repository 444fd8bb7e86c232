//! Error types for diagram operations.

use std::io;

use thiserror::Error;

/// The main error type for mind-map operations.
///
/// Only document import, file I/O and configuration loading can fail; the
/// in-memory mutations of the store never do.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// The imported text is not a well-formed diagram document.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DiagramError {
    pub fn is_parse(&self) -> bool {
        matches!(self, DiagramError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, DiagramError>;
