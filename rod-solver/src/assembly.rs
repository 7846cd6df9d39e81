//! Global stiffness matrix and load vector assembly

use crate::math::{self, Mat, Vec as FEVec};
use crate::model::Structure;

/// Unconstrained global system `K · Δ = F`
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSystem {
    /// n x n stiffness matrix
    pub stiffness: Mat,
    /// Nodal load vector of length n
    pub loads: FEVec,
}

impl GlobalSystem {
    /// Number of degrees of freedom (one per node)
    pub fn dofs(&self) -> usize {
        self.loads.len()
    }
}

/// Build K and F for a rod chain
///
/// Rod `i` couples DOFs `i` and `i + 1`. Rods are visited in order so the
/// floating point summation is reproducible. Distributed loads enter as
/// equivalent nodal loads; concentrated node loads are added afterwards.
pub fn assemble(structure: &Structure) -> GlobalSystem {
    let n = structure.nodes.len();

    let mut k_global = Mat::zeros(n, n);
    let mut p = FEVec::zeros(n);

    for (i, rod) in structure.rods.iter().enumerate() {
        let k_local = math::rod_local_stiffness(rod.elastic_modulus, rod.area, rod.length);
        let fer = math::fer_uniform_axial(rod.distributed_load, rod.length);

        let dofs = [i, i + 1];
        for (a, &da) in dofs.iter().enumerate() {
            for (b, &db) in dofs.iter().enumerate() {
                k_global[(da, db)] += k_local[(a, b)];
            }
            p[da] += fer[a];
        }
    }

    for (j, node) in structure.nodes.iter().enumerate() {
        p[j] += node.external_force;
    }

    log::debug!(
        "Assembled {0}x{0} stiffness matrix from {1} rods",
        n,
        structure.rods.len()
    );

    GlobalSystem {
        stiffness: k_global,
        loads: p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Node, Rod};
    use approx::assert_relative_eq;

    fn two_rod_chain() -> Structure {
        Structure::new(
            vec![Node::fixed(0), Node::loaded(1, 100.0), Node::loaded(2, -40.0)],
            vec![
                Rod::new(0, 1.0, 2.0, 10.0, 1.0).with_distributed_load(4.0),
                Rod::new(1, 2.0, 1.0, 10.0, 1.0),
            ],
        )
    }

    #[test]
    fn test_stiffness_pattern() {
        let system = assemble(&two_rod_chain());
        let k = &system.stiffness;

        // k0 = 10*2/1 = 20, k1 = 10*1/2 = 5
        assert_relative_eq!(k[(0, 0)], 20.0);
        assert_relative_eq!(k[(0, 1)], -20.0);
        assert_relative_eq!(k[(1, 1)], 25.0);
        assert_relative_eq!(k[(1, 2)], -5.0);
        assert_relative_eq!(k[(2, 2)], 5.0);
        assert_relative_eq!(k[(0, 2)], 0.0);
        assert_eq!(system.dofs(), 3);
    }

    #[test]
    fn test_stiffness_symmetric_with_rigid_body_mode() {
        let k = assemble(&two_rod_chain()).stiffness;
        assert_eq!(k, k.transpose());

        // Uniform translation produces no force
        let ones = FEVec::from_element(3, 1.0);
        assert!((&k * ones).amax() < 1e-12);
    }

    #[test]
    fn test_load_vector() {
        let f = assemble(&two_rod_chain()).loads;
        // q*L/2 = 2 on nodes 0 and 1
        assert_relative_eq!(f[0], 2.0);
        assert_relative_eq!(f[1], 102.0);
        assert_relative_eq!(f[2], -40.0);
    }
}
