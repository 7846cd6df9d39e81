//! Result types for rod chain analysis

use serde::{Deserialize, Serialize};

use crate::elements::Node;
use crate::math::Vec as FEVec;

/// Nodal displacements, one entry per node in node order
///
/// Built once by the analysis and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplacementVector(Vec<f64>);

impl DisplacementVector {
    /// Wrap a full displacement list
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// All-zero displacements for `n` nodes
    pub fn zeros(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the chain has no nodes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Displacement of the node at `index`
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Displacements as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate over the displacements
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Copy into a dense vector for matrix products
    pub fn to_dvector(&self) -> FEVec {
        FEVec::from_column_slice(&self.0)
    }

    /// Index and value of the largest displacement magnitude
    pub fn max_abs(&self) -> Option<(usize, f64)> {
        self.0
            .iter()
            .enumerate()
            .fold(None, |best, (i, &d)| match best {
                Some((_, m)) if m >= d.abs() => best,
                _ => Some((i, d.abs())),
            })
    }
}

/// Coefficients of `f(x) = a0 + a1·x + a2·x²`; `a2` is absent for linear functions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialCoeffs {
    pub a0: f64,
    pub a1: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2: Option<f64>,
}

impl PolynomialCoeffs {
    /// Linear function `a0 + a1·x`
    pub fn linear(a0: f64, a1: f64) -> Self {
        Self { a0, a1, a2: None }
    }

    /// Quadratic function `a0 + a1·x + a2·x²`
    pub fn quadratic(a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            a0,
            a1,
            a2: Some(a2),
        }
    }

    /// Evaluate at `x`
    pub fn eval(&self, x: f64) -> f64 {
        self.a0 + self.a1 * x + self.a2.unwrap_or(0.0) * x * x
    }
}

/// Internal force, displacement and stress distribution along one rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementResult {
    pub rod_id: i64,
    pub length: f64,
    pub area: f64,
    pub elastic_modulus: f64,
    pub allowable_stress: f64,
    pub distributed_load: f64,
    /// Left (lower index) and right node
    #[serde(rename = "nodeRelatedTo")]
    pub nodes: [Node; 2],
    /// N(x) = a0 + a1·x
    pub axial_force_coeffs: PolynomialCoeffs,
    /// u(x) = a0 + a1·x + a2·x²
    pub displacement_coeffs: PolynomialCoeffs,
    /// σ(x) = a0 + a1·x
    pub stress_coeffs: PolynomialCoeffs,
    /// max |σ(x)| over the rod
    #[serde(rename = "maxStressOnTheRod")]
    pub max_stress: f64,
}

impl ElementResult {
    /// Axial force N(x)
    pub fn axial_force_at(&self, x: f64) -> f64 {
        self.axial_force_coeffs.eval(x)
    }

    /// Axial displacement u(x)
    pub fn displacement_at(&self, x: f64) -> f64 {
        self.displacement_coeffs.eval(x)
    }

    /// Normal stress σ(x)
    pub fn stress_at(&self, x: f64) -> f64 {
        self.stress_coeffs.eval(x)
    }

    /// Ratio of peak stress to allowable stress
    pub fn utilization(&self) -> f64 {
        self.max_stress / self.allowable_stress
    }

    /// Peak stress exceeds the allowable stress
    pub fn is_overstressed(&self) -> bool {
        self.max_stress > self.allowable_stress
    }
}

/// Complete analysis output: nodal displacements plus one result per rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullResult {
    pub displacements: DisplacementVector,
    #[serde(rename = "resultOutput")]
    pub elements: Vec<ElementResult>,
}

impl FullResult {
    /// Rod with the highest utilization
    pub fn critical_element(&self) -> Option<&ElementResult> {
        self.elements
            .iter()
            .max_by(|a, b| a.utilization().total_cmp(&b.utilization()))
    }

    /// True when no rod exceeds its allowable stress
    pub fn passes_strength_check(&self) -> bool {
        self.elements.iter().all(|e| !e.is_overstressed())
    }
}

/// Support reaction at a fixed node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReaction {
    pub node_id: i64,
    /// Position of the node in the chain
    pub node_index: usize,
    /// Force exerted by the support on the chain (N)
    pub force: f64,
}

/// Global force balance of a solved structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumCheck {
    /// Sum of concentrated and distributed loads
    pub applied: f64,
    /// Sum of support reactions
    pub reactions: f64,
    /// applied + reactions, zero for a balanced structure
    pub residual: f64,
}

impl EquilibriumCheck {
    /// Residual within `tolerance` relative to the applied load magnitude
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        self.residual.abs() <= tolerance * self.applied.abs().max(1.0)
    }
}
