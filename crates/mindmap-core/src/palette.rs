//! Color palette shared by new nodes and edges

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// Colors handed out to new nodes and edges.
pub const DEFAULT_COLORS: [&str; 5] = ["#FF6B6B", "#4ECDC4", "#FFD166", "#6A0572", "#1A535C"];

/// A non-empty list of display colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Result<Self, DiagramError> {
        if colors.is_empty() {
            return Err(DiagramError::InvalidConfig(
                "palette must contain at least one color".to_string(),
            ));
        }
        Ok(Palette { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Draw an index uniformly from the palette.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> usize {
        rng.random_range(0..self.colors.len())
    }

    /// Color at `index`, wrapping around the palette.
    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = DiagramError;

    fn try_from(colors: Vec<String>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}
