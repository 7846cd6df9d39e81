//! Analysis types and options

use serde::{Deserialize, Serialize};

/// Dense direct solver used for the reduced system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// LU decomposition with partial pivoting
    #[default]
    Lu,
    /// Cholesky decomposition (reduced matrix is symmetric positive definite)
    Cholesky,
}

/// Options for structural analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Solver for the reduced system
    pub solver: SolverKind,
    /// Relative pivot magnitude below which the reduced matrix counts as singular
    pub pivot_tolerance: f64,
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Relative tolerance of the equilibrium check
    pub statics_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            solver: SolverKind::Lu,
            pivot_tolerance: 1e-12,
            check_statics: false,
            statics_tolerance: 1e-6,
        }
    }
}

impl AnalysisOptions {
    /// Create options for a plain linear static analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Select the solver
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Set the singular pivot tolerance
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Enable the equilibrium check with the given relative tolerance
    pub fn with_statics_check(mut self, tol: f64) -> Self {
        self.check_statics = true;
        self.statics_tolerance = tol;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let opts = AnalysisOptions::linear()
            .with_solver(SolverKind::Cholesky)
            .with_statics_check(1e-9);
        assert_eq!(opts.solver, SolverKind::Cholesky);
        assert!(opts.check_statics);
        assert_eq!(opts.statics_tolerance, 1e-9);
        assert_eq!(opts.pivot_tolerance, AnalysisOptions::default().pivot_tolerance);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: AnalysisOptions = serde_json::from_str(r#"{"solver": "cholesky"}"#).unwrap();
        assert_eq!(opts.solver, SolverKind::Cholesky);
        assert!(!opts.check_statics);
    }
}
