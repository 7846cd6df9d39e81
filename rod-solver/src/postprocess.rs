//! Per-rod axial force, displacement and stress distributions
//!
//! With the local coordinate `x ∈ [0, L]` measured from the left node, a rod
//! under end displacements `Δi`, `Δj` and uniform load `q` has
//!
//! - `N(x) = EA/L·(Δj − Δi) + qL/2 − q·x`
//! - `u(x) = Δi + ((Δj − Δi)/L + qL/(2EA))·x − q/(2EA)·x²`
//! - `σ(x) = N(x) / A`
//!
//! These are exact for the two-node rod, so no sampling is needed to find the
//! peak stress: `σ` is affine and peaks at one of the ends.

use crate::elements::{Node, Rod};
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::Structure;
use crate::results::{DisplacementVector, ElementResult, PolynomialCoeffs};

/// Closed-form result for one rod given its end displacements
pub fn element_result(rod: &Rod, left: Node, right: Node, d_i: f64, d_j: f64) -> ElementResult {
    let l = rod.length;
    let a = rod.area;
    let ea = rod.rigidity();
    let q = rod.distributed_load;

    let a0 = rod.stiffness() * (d_j - d_i) + q * l / 2.0;
    let a1 = -q;

    let b0 = d_i;
    let b1 = (d_j - d_i) / l + q * l / (2.0 * ea);
    let b2 = -q / (2.0 * ea);

    let c0 = a0 / a;
    let c1 = a1 / a;

    let max_stress = c0.abs().max((c0 + c1 * l).abs());

    ElementResult {
        rod_id: rod.id,
        length: l,
        area: a,
        elastic_modulus: rod.elastic_modulus,
        allowable_stress: rod.allowable_stress,
        distributed_load: q,
        nodes: [left, right],
        axial_force_coeffs: PolynomialCoeffs::linear(a0, a1),
        displacement_coeffs: PolynomialCoeffs::quadratic(b0, b1, b2),
        stress_coeffs: PolynomialCoeffs::linear(c0, c1),
        max_stress,
    }
}

/// Compute one [`ElementResult`] per rod, in rod order
pub fn process(
    structure: &Structure,
    displacements: &DisplacementVector,
) -> AnalysisResult<Vec<ElementResult>> {
    let n = structure.nodes.len();
    if displacements.len() != n {
        return Err(AnalysisError::Shape(format!(
            "displacement vector has {} entries for {} nodes",
            displacements.len(),
            n
        )));
    }
    if structure.rods.len() + 1 != n {
        return Err(AnalysisError::Shape(format!(
            "{} rods cannot connect {} nodes in a chain",
            structure.rods.len(),
            n
        )));
    }

    let d = displacements.as_slice();
    let results = structure
        .rods
        .iter()
        .enumerate()
        .map(|(i, rod)| {
            element_result(
                rod,
                structure.nodes[i],
                structure.nodes[i + 1],
                d[i],
                d[i + 1],
            )
        })
        .collect();

    Ok(results)
}
