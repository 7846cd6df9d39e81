//! Rod chain model - the structure container and the analysis pipeline

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::assembly;
use crate::elements::{Node, Rod};
use crate::error::{AnalysisError, AnalysisResult};
use crate::math;
use crate::postprocess;
use crate::reduction;
use crate::results::{DisplacementVector, EquilibriumCheck, FullResult, NodeReaction};

/// A chain of rods: rod `i` joins node `i` and node `i + 1`
///
/// The structure is a plain value. Analysis methods borrow it and return fresh
/// results; nothing is cached on the structure itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Rods in chain order
    #[serde(default)]
    pub rods: Vec<Rod>,
    /// Nodes in chain order
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Structure {
    /// Create a structure from its nodes and rods
    pub fn new(nodes: Vec<Node>, rods: Vec<Rod>) -> Self {
        Self { rods, nodes }
    }

    /// Number of nodes (degrees of freedom)
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of rods
    pub fn num_rods(&self) -> usize {
        self.rods.len()
    }

    /// Re-check the invariants the engine relies on
    ///
    /// Ids are not inspected here; the chain topology is purely positional.
    pub fn check_shape(&self) -> AnalysisResult<()> {
        let n = self.nodes.len();
        if n == 0 || self.rods.is_empty() {
            return Err(AnalysisError::Shape(
                "structure needs at least one rod and two nodes".to_string(),
            ));
        }
        if self.rods.len() + 1 != n {
            return Err(AnalysisError::Shape(format!(
                "expected {} nodes for {} rods, found {}",
                self.rods.len() + 1,
                self.rods.len(),
                n
            )));
        }

        for rod in &self.rods {
            rod.check_properties()?;
        }
        if let Some(node) = self.nodes.iter().find(|n| !n.external_force.is_finite()) {
            return Err(AnalysisError::Shape(format!(
                "node {} has a non-finite external force",
                node.id
            )));
        }

        if !self.nodes.iter().any(|n| n.fixed) {
            return Err(AnalysisError::Underconstrained);
        }
        if let Some(node) = self.nodes[1..n - 1].iter().find(|n| n.fixed) {
            return Err(AnalysisError::Shape(format!(
                "node {} is fixed but supports are only allowed at the chain ends",
                node.id
            )));
        }

        Ok(())
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Solve for the nodal displacements
    ///
    /// A fully fixed chain yields an all-zero vector without calling the solver.
    pub fn displacements(&self, options: &AnalysisOptions) -> AnalysisResult<DisplacementVector> {
        self.check_shape()?;

        let n = self.nodes.len();
        let system = assembly::assemble(self);
        let reduced = reduction::reduce(&system, &self.nodes);

        if reduced.is_empty() {
            log::debug!("All {} nodes fixed, displacements are zero", n);
            return Ok(DisplacementVector::zeros(n));
        }

        let d_free = math::solve(
            &reduced.stiffness,
            &reduced.loads,
            options.solver,
            options.pivot_tolerance,
        )?;

        Ok(reduction::expand(&d_free, &reduced.free, n))
    }

    /// Run the full analysis: displacements plus per-rod distributions
    pub fn analyze(&self, options: &AnalysisOptions) -> AnalysisResult<FullResult> {
        let displacements = self.displacements(options)?;
        let elements = postprocess::process(self, &displacements)?;

        if options.check_statics {
            let check = self.equilibrium(&displacements)?;
            if !check.is_balanced(options.statics_tolerance) {
                log::warn!("Equilibrium residual {:e}", check.residual);
                return Err(AnalysisError::Equilibrium {
                    residual: check.residual,
                });
            }
        }

        log::debug!(
            "Analyzed {} rods, peak stress {:e}",
            elements.len(),
            elements.iter().fold(0.0_f64, |m, e| m.max(e.max_stress))
        );

        Ok(FullResult {
            displacements,
            elements,
        })
    }

    /// Run a linear analysis with default options
    pub fn analyze_linear(&self) -> AnalysisResult<FullResult> {
        self.analyze(&AnalysisOptions::linear())
    }

    /// Support reactions `K·Δ − F` at the fixed nodes
    pub fn reactions(&self, displacements: &DisplacementVector) -> AnalysisResult<Vec<NodeReaction>> {
        self.check_shape()?;
        if displacements.len() != self.nodes.len() {
            return Err(AnalysisError::Shape(format!(
                "displacement vector has {} entries for {} nodes",
                displacements.len(),
                self.nodes.len()
            )));
        }

        let system = assembly::assemble(self);
        let r = &system.stiffness * displacements.to_dvector() - &system.loads;

        Ok(self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.fixed)
            .map(|(i, node)| NodeReaction {
                node_id: node.id,
                node_index: i,
                force: r[i],
            })
            .collect())
    }

    /// Balance of applied loads against support reactions
    pub fn equilibrium(&self, displacements: &DisplacementVector) -> AnalysisResult<EquilibriumCheck> {
        let reactions: f64 = self.reactions(displacements)?.iter().map(|r| r.force).sum();
        let applied: f64 = self.nodes.iter().map(|n| n.external_force).sum::<f64>()
            + self.rods.iter().map(Rod::total_distributed_load).sum::<f64>();

        Ok(EquilibriumCheck {
            applied,
            reactions,
            residual: applied + reactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cantilever() -> Structure {
        Structure::new(
            vec![Node::fixed(0), Node::loaded(1, -10000.0)],
            vec![Rod::new(0, 2.0, 0.01, 2.1e11, 250e6)],
        )
    }

    #[test]
    fn test_simple_cantilever() {
        let result = cantilever().analyze_linear().unwrap();

        assert_eq!(result.displacements.get(0), Some(0.0));
        assert_relative_eq!(
            result.displacements.as_slice()[1],
            -10000.0 / 1.05e9,
            max_relative = 1e-12
        );

        let e = &result.elements[0];
        assert_relative_eq!(e.axial_force_coeffs.a0, -10000.0, max_relative = 1e-9);
        assert_eq!(e.axial_force_coeffs.a1, 0.0);
        assert_relative_eq!(e.stress_coeffs.a0, -1.0e6, max_relative = 1e-9);
        assert_relative_eq!(e.max_stress, 1.0e6, max_relative = 1e-9);
    }

    #[test]
    fn test_cantilever_reaction() {
        let s = cantilever();
        let d = s.displacements(&AnalysisOptions::default()).unwrap();
        let reactions = s.reactions(&d).unwrap();

        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].node_index, 0);
        assert_relative_eq!(reactions[0].force, 10000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_shape_errors() {
        let mut s = cantilever();
        s.nodes.push(Node::new(2));
        assert_eq!(s.check_shape().unwrap_err().kind(), "shape");

        assert_eq!(Structure::default().check_shape().unwrap_err().kind(), "shape");
    }

    #[test]
    fn test_interior_support_rejected() {
        let s = Structure::new(
            vec![Node::fixed(0), Node::fixed(1), Node::new(2)],
            vec![Rod::new(0, 1.0, 1.0, 1.0, 1.0), Rod::new(1, 1.0, 1.0, 1.0, 1.0)],
        );
        assert!(matches!(s.check_shape(), Err(AnalysisError::Shape(_))));
    }

    #[test]
    fn test_unsupported_chain_is_underconstrained() {
        let s = Structure::new(
            vec![Node::new(0), Node::loaded(1, 5.0)],
            vec![Rod::new(0, 1.0, 1.0, 1.0, 1.0)],
        );
        assert_eq!(s.analyze_linear().unwrap_err(), AnalysisError::Underconstrained);
    }

    #[test]
    fn test_bad_rod_property() {
        let s = Structure::new(
            vec![Node::fixed(0), Node::new(1)],
            vec![Rod::new(7, -1.0, 1.0, 1.0, 1.0)],
        );
        assert!(matches!(
            s.displacements(&AnalysisOptions::default()),
            Err(AnalysisError::NumericRange { rod: 7, property: "length", .. })
        ));
    }

    #[test]
    fn test_structure_json() {
        let s: Structure = serde_json::from_str(
            r#"{"rods": [{"id": 0, "length": 2, "area": 0.01, "elasticModulus": 2.1e11,
                          "allowableStress": 2.5e8, "distributedLoad": 0}],
                "nodes": [{"id": 0, "fixed": true, "externalForce": 0},
                          {"id": 1, "fixed": false, "externalForce": -10000}]}"#,
        )
        .unwrap();
        assert_eq!(s, cantilever());
    }
}
