//! Result types for the analyses

use serde::{Deserialize, Serialize};

use crate::math::Vec as DVec;

/// Nodal and element results of one analysis call.
///
/// All nodal vectors are 3n long (DOF = 3·node + axis); reactions are
/// nonzero only on fixed DOFs and the residual only on free DOFs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Displacements (m)
    pub displacements: DVec,
    /// Support reactions (N)
    pub reactions: DVec,
    /// Resisting forces A·t (N)
    pub resisting_forces: DVec,
    /// Unbalanced load at the free DOFs (N)
    pub residual: DVec,
    /// Element tensions (N), positive in tension
    pub tensions: DVec,
    /// Whether the residual is within the configured tolerance
    pub equilibrium: bool,
}

impl Results {
    /// Displacement of one node as [dx, dy, dz]
    pub fn node_displacement(&self, node: usize) -> [f64; 3] {
        [
            self.displacements[3 * node],
            self.displacements[3 * node + 1],
            self.displacements[3 * node + 2],
        ]
    }

    /// Reaction at one node as [fx, fy, fz]
    pub fn node_reaction(&self, node: usize) -> [f64; 3] {
        [
            self.reactions[3 * node],
            self.reactions[3 * node + 1],
            self.reactions[3 * node + 2],
        ]
    }

    /// Largest nodal translation magnitude (m)
    pub fn max_displacement(&self) -> f64 {
        let nodes = self.displacements.len() / 3;
        (0..nodes).fold(0.0_f64, |m, n| {
            let d = self.node_displacement(n);
            m.max((d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt())
        })
    }

    /// Largest unbalanced force component (N)
    pub fn max_residual(&self) -> f64 {
        self.residual.iter().fold(0.0_f64, |m, r| m.max(r.abs()))
    }
}
