//! Node element - a joint between two consecutive rods

use serde::{Deserialize, Serialize};

/// A node of the rod chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node number
    pub id: i64,
    /// Rigid support - displacement constrained to zero
    #[serde(default)]
    pub fixed: bool,
    /// Concentrated load (N), positive = tension
    #[serde(default)]
    pub external_force: f64,
}

impl Node {
    /// Create an unloaded, unsupported node
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fixed: false,
            external_force: 0.0,
        }
    }

    /// Create a rigidly fixed node
    pub fn fixed(id: i64) -> Self {
        Self {
            fixed: true,
            ..Self::new(id)
        }
    }

    /// Create a free node carrying a concentrated load
    pub fn loaded(id: i64, force: f64) -> Self {
        Self {
            external_force: force,
            ..Self::new(id)
        }
    }

    /// Return a copy with the concentrated load replaced
    pub fn with_force(self, force: f64) -> Self {
        Self {
            external_force: force,
            ..self
        }
    }
}
