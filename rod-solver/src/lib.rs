//! Rod Solver - a native Rust finite element engine for axial rod chains
//!
//! A structure is a straight chain of two-node rods loaded along their axis.
//! The library provides:
//! - Global stiffness and load assembly
//! - Support conditions by row/column elimination
//! - Dense LU or Cholesky solution of the reduced system
//! - Closed-form axial force, displacement and stress per rod
//! - Support reactions and a global equilibrium check
//! - Input validation and section sampling helpers
//!
//! ## Example
//! ```rust
//! use rod_solver::prelude::*;
//!
//! // A 2 m steel rod clamped at the left end and pulled at the right end
//! let structure = Structure::new(
//!     vec![Node::fixed(0), Node::loaded(1, -10_000.0)],
//!     vec![Rod::new(0, 2.0, 0.01, 2.1e11, 250e6)],
//! );
//!
//! let result = structure.analyze(&AnalysisOptions::default()).unwrap();
//!
//! let tip = result.displacements.get(1).unwrap();
//! assert!((tip + 9.523_809_5e-6).abs() < 1e-12);
//! assert!((result.elements[0].max_stress - 1.0e6).abs() < 1e-3);
//! ```

pub mod analysis;
pub mod assembly;
pub mod elements;
pub mod error;
pub mod math;
pub mod model;
pub mod postprocess;
pub mod reduction;
pub mod results;
pub mod sampling;
pub mod validation;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, SolverKind};
    pub use crate::elements::{Node, Rod};
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::model::Structure;
    pub use crate::results::{
        DisplacementVector, ElementResult, EquilibriumCheck, FullResult, NodeReaction,
        PolynomialCoeffs,
    };
    pub use crate::sampling::{sample_uniform, SectionSample, SectionValues};
    pub use crate::validation::{first_error, is_valid, validate};
}
