//! Boundary condition reduction and displacement expansion

use crate::assembly::GlobalSystem;
use crate::elements::Node;
use crate::math::{Mat, Vec as FEVec};
use crate::results::DisplacementVector;

/// Reduced system over the free degrees of freedom
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Free node indices in ascending order
    pub free: Vec<usize>,
    /// K restricted to the free rows and columns
    pub stiffness: Mat,
    /// F restricted to the free entries
    pub loads: FEVec,
}

impl Reduction {
    /// True when every node is fixed and there is nothing to solve
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

/// Indices of the nodes that are not fixed
pub fn free_indices(nodes: &[Node]) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| if !node.fixed { Some(i) } else { None })
        .collect()
}

/// Partition the global system and keep the free block
pub fn reduce(system: &GlobalSystem, nodes: &[Node]) -> Reduction {
    let free = free_indices(nodes);
    let m = free.len();

    let mut k11 = Mat::zeros(m, m);
    let mut p1 = FEVec::zeros(m);

    for (i, &di) in free.iter().enumerate() {
        p1[i] = system.loads[di];
        for (j, &dj) in free.iter().enumerate() {
            k11[(i, j)] = system.stiffness[(di, dj)];
        }
    }

    log::debug!("{} of {} degrees of freedom are free", m, nodes.len());

    Reduction {
        free,
        stiffness: k11,
        loads: p1,
    }
}

/// Scatter the free displacements into a full vector with zeros at fixed nodes
pub fn expand(d_free: &FEVec, free: &[usize], n: usize) -> DisplacementVector {
    let mut d_full = vec![0.0; n];
    for (i, &di) in free.iter().enumerate() {
        d_full[di] = d_free[i];
    }
    DisplacementVector::from_vec(d_full)
}

/// Gather the entries of a full vector at the free indices
pub fn restrict(full: &DisplacementVector, free: &[usize]) -> FEVec {
    FEVec::from_iterator(free.len(), free.iter().map(|&i| full.as_slice()[i]))
}
