//! Error types for the rod chain solver

use thiserror::Error;

/// Main error type for analysis operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid structure shape: {0}")]
    Shape(String),

    #[error("Structure is underconstrained - at least one node must be fixed")]
    Underconstrained,

    #[error("Singular stiffness matrix (pivot {pivot:e}) - structure may be disconnected or insufficiently supported")]
    SingularSystem { pivot: f64 },

    #[error("Rod {rod}: {property} must be positive and finite (received {value})")]
    NumericRange {
        rod: i64,
        property: &'static str,
        value: f64,
    },

    #[error("Static equilibrium not satisfied (residual {residual:e})")]
    Equilibrium { residual: f64 },

    #[error("Section x = {x} lies outside rod {rod} (length {length})")]
    OutOfRange { rod: i64, x: f64, length: f64 },

    #[error("Sampling step must be positive (received {0})")]
    InvalidStep(f64),
}

impl AnalysisError {
    /// Stable machine-readable tag for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shape(_) => "shape",
            Self::Underconstrained => "underconstrained",
            Self::SingularSystem { .. } => "singular_system",
            Self::NumericRange { .. } => "numeric_range",
            Self::Equilibrium { .. } => "equilibrium",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidStep(_) => "invalid_step",
        }
    }

    /// True for failures caused by the input rather than by the numerics
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::SingularSystem { .. } | Self::Equilibrium { .. })
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
