//! Analysis algorithms over structure snapshots
//!
//! Each solver consumes a snapshot plus increment data and returns a fresh
//! snapshot with its results; none of them mutate their input.

pub mod linear;
pub mod modal;
pub mod nonlinear;
pub mod relaxation;
pub mod svd;

use serde::{Deserialize, Serialize};

use crate::equilibrium::Geometry;
use crate::math::Mat;
use crate::model::Structure;

/// Combined absolute + relative residual tolerance (N)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResidualTolerance {
    /// Absolute unbalanced-force bound (N)
    pub absolute: f64,
    /// Bound relative to the largest applied load component
    pub relative: f64,
}

impl Default for ResidualTolerance {
    fn default() -> Self {
        Self {
            absolute: 1e-3,
            relative: 1e-6,
        }
    }
}

impl ResidualTolerance {
    /// Check a residual magnitude against a load reference magnitude
    pub fn satisfied(&self, residual: f64, reference: f64) -> bool {
        residual <= self.absolute + self.relative * reference
    }
}

/// Axial stiffness 1/flexibility, zero for an inactive (slack) element.
pub(crate) fn axial_stiffness(flexibility: f64) -> f64 {
    if flexibility.is_finite() {
        1.0 / flexibility
    } else {
        0.0
    }
}

/// Assemble the global tangent stiffness at the current configuration:
/// material stiffness s·ccᵗ with the outward cosine vector
/// c = [−cx,−cy,−cz,cx,cy,cz], plus the force-density geometric template.
pub(crate) fn assemble_tangent_stiffness(structure: &Structure, geometry: &Geometry) -> Mat {
    let mut k = Mat::zeros(structure.dof_count(), structure.dof_count());
    for (e, element) in structure.elements().iter().enumerate() {
        let s = axial_stiffness(geometry.flexibilities[e]);
        let force_density = element.tension / geometry.lengths[e];

        let u = [
            geometry.cosines[(e, 0)],
            geometry.cosines[(e, 1)],
            geometry.cosines[(e, 2)],
        ];
        let c = [-u[0], -u[1], -u[2], u[0], u[1], u[2]];
        let dofs = [
            3 * element.end_a,
            3 * element.end_a + 1,
            3 * element.end_a + 2,
            3 * element.end_b,
            3 * element.end_b + 1,
            3 * element.end_b + 2,
        ];

        if s != 0.0 {
            for i in 0..6 {
                for j in 0..6 {
                    k[(dofs[i], dofs[j])] += s * c[i] * c[j];
                }
            }
        }
        if force_density != 0.0 {
            for axis in 0..3 {
                let (da, db) = (dofs[axis], dofs[3 + axis]);
                k[(da, da)] += force_density;
                k[(db, db)] += force_density;
                k[(da, db)] -= force_density;
                k[(db, da)] -= force_density;
            }
        }
    }
    k
}
