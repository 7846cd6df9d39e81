//! Mathematical utilities for rod element calculations

use nalgebra::{DMatrix, DVector, Matrix2, Vector2};

use crate::analysis::SolverKind;
use crate::error::{AnalysisError, AnalysisResult};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat2 = Matrix2<f64>;
pub type Vec2 = Vector2<f64>;

/// Compute the local stiffness matrix for a two-node axial rod
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `length` - Rod length
///
/// # Returns
/// 2x2 matrix `EA/L * [[1, -1], [-1, 1]]`
pub fn rod_local_stiffness(e: f64, a: f64, length: f64) -> Mat2 {
    let k = e * a / length;

    #[rustfmt::skip]
    let data = [
         k, -k,
        -k,  k,
    ];

    Mat2::from_row_slice(&data)
}

/// Equivalent nodal loads for a uniform axial load `w` over the full rod
///
/// Each end node takes half of the resultant `w * L`.
pub fn fer_uniform_axial(w: f64, length: f64) -> Vec2 {
    let half = w * length / 2.0;
    Vec2::new(half, half)
}

/// Smallest absolute pivot of the LU factor relative to the largest diagonal
/// entry of `a`. Returns `(min_pivot, max_diagonal)`.
fn lu_pivot_range(u: &Mat, a: &Mat) -> (f64, f64) {
    let min_pivot = u
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, p| acc.min(p.abs()));
    let max_diag = a
        .diagonal()
        .iter()
        .fold(0.0_f64, |acc, d| acc.max(d.abs()));
    (min_pivot, max_diag)
}

/// Solve a linear system using LU decomposition with partial pivoting
///
/// Fails with [`AnalysisError::SingularSystem`] when the smallest pivot is not
/// larger than `pivot_tolerance` times the largest diagonal entry of `a`.
pub fn solve_linear_system(a: &Mat, b: &Vec, pivot_tolerance: f64) -> AnalysisResult<Vec> {
    let lu = a.clone().lu();
    let (min_pivot, max_diag) = lu_pivot_range(&lu.u(), a);

    if !(max_diag > 0.0) || !(min_pivot > pivot_tolerance * max_diag) {
        log::warn!(
            "LU pivot {:e} below tolerance ({:e} x {:e})",
            min_pivot,
            pivot_tolerance,
            max_diag
        );
        return Err(AnalysisError::SingularSystem { pivot: min_pivot });
    }

    let x = lu
        .solve(b)
        .ok_or(AnalysisError::SingularSystem { pivot: min_pivot })?;
    ensure_finite(x, min_pivot)
}

/// Solve a linear system using Cholesky decomposition (for symmetric positive definite)
pub fn solve_cholesky(a: &Mat, b: &Vec, pivot_tolerance: f64) -> AnalysisResult<Vec> {
    let chol = a
        .clone()
        .cholesky()
        .ok_or(AnalysisError::SingularSystem { pivot: 0.0 })?;

    // Pivots of the equivalent LDLᵀ factorisation are the squared diagonal of L
    let min_pivot = chol
        .l_dirty()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, l| acc.min(l * l));
    let max_diag = a
        .diagonal()
        .iter()
        .fold(0.0_f64, |acc, d| acc.max(d.abs()));

    if !(min_pivot > pivot_tolerance * max_diag) {
        log::warn!("Cholesky pivot {:e} below tolerance", min_pivot);
        return Err(AnalysisError::SingularSystem { pivot: min_pivot });
    }

    ensure_finite(chol.solve(b), min_pivot)
}

/// Dispatch to the selected dense direct solver
pub fn solve(a: &Mat, b: &Vec, kind: SolverKind, pivot_tolerance: f64) -> AnalysisResult<Vec> {
    log::trace!("Solving {0}x{0} system with {1:?}", a.nrows(), kind);
    match kind {
        SolverKind::Lu => solve_linear_system(a, b, pivot_tolerance),
        SolverKind::Cholesky => solve_cholesky(a, b, pivot_tolerance),
    }
}

fn ensure_finite(x: Vec, pivot: f64) -> AnalysisResult<Vec> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(AnalysisError::SingularSystem { pivot })
    }
}
