//! Dynamic modal analysis: natural frequencies and mode shapes
//!
//! Solves the generalized eigenproblem K·Φ = ω²·M·Φ over the free DOFs, with
//! K the tangent stiffness (material plus geometric, so prestress detunes the
//! spectrum) and M a lumped diagonal mass matrix from nodal masses plus half
//! of each element mass at either end. Because M is diagonal the Cholesky
//! reduction to a standard symmetric eigenproblem collapses to the M^{-1/2}
//! congruence K* = M^{-1/2}·K·M^{-1/2}, Φ = M^{-1/2}·Ψ.

use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};

use crate::analysis::assemble_tangent_stiffness;
use crate::equilibrium;
use crate::error::{SolverError, SolverResult};
use crate::math::Mat;
use crate::model::Structure;

/// Natural frequencies and re-embedded mode shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalReport {
    /// Natural frequencies (Hz), ascending; non-positive eigenvalues
    /// (mechanism or buckled modes) are reported as 0 Hz
    pub frequencies: Vec<f64>,
    /// Mass-normalized mode shapes as columns over the full 3n DOF space,
    /// zero at fixed DOFs
    pub mode_shapes: Mat,
}

impl ModalReport {
    /// Number of modes returned
    pub fn mode_count(&self) -> usize {
        self.frequencies.len()
    }
}

/// Compute natural frequencies and mode shapes at the current tension state.
///
/// `nodal_masses` is one mass per node (kg); `element_masses` is one mass per
/// element (kg), lumped half to each end node. Every free node must end up
/// with a positive mass. `mode_cap` truncates the report to the lowest modes
/// if given.
pub fn analyze_modes(
    structure: &Structure,
    nodal_masses: &[f64],
    element_masses: &[f64],
    mode_cap: Option<usize>,
) -> SolverResult<ModalReport> {
    let node_count = structure.node_count();
    if nodal_masses.len() != node_count {
        return Err(SolverError::DimensionMismatch {
            what: "nodal mass vector",
            expected: node_count,
            actual: nodal_masses.len(),
        });
    }
    if element_masses.len() != structure.element_count() {
        return Err(SolverError::DimensionMismatch {
            what: "element mass vector",
            expected: structure.element_count(),
            actual: element_masses.len(),
        });
    }

    let mut lumped = nodal_masses.to_vec();
    for (e, element) in structure.elements().iter().enumerate() {
        lumped[element.end_a] += 0.5 * element_masses[e];
        lumped[element.end_b] += 0.5 * element_masses[e];
    }

    let geometry = equilibrium::geometry(structure)?;
    let stiffness = assemble_tangent_stiffness(structure, &geometry);

    let free = structure.free_dofs();
    let free_count = free.len();
    let mut masses = vec![0.0; free_count];
    for (i, &dof) in free.iter().enumerate() {
        let node = dof / 3;
        let mass = lumped[node];
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(SolverError::MassNotPositive(node));
        }
        masses[i] = mass;
    }

    let reduced = Mat::from_fn(free_count, free_count, |i, j| {
        stiffness[(free[i], free[j])] / (masses[i] * masses[j]).sqrt()
    });

    let eigen = SymmetricEigen::new(reduced);
    let mut order: Vec<usize> = (0..free_count).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let kept = mode_cap.unwrap_or(free_count).min(free_count);
    let mut frequencies = Vec::with_capacity(kept);
    let mut mode_shapes = Mat::zeros(structure.dof_count(), kept);
    for (column, &i) in order.iter().take(kept).enumerate() {
        let lambda = eigen.eigenvalues[i];
        frequencies.push(if lambda > 0.0 {
            lambda.sqrt() / (2.0 * std::f64::consts::PI)
        } else {
            0.0
        });
        for (row, &dof) in free.iter().enumerate() {
            mode_shapes[(dof, column)] = eigen.eigenvectors[(row, i)] / masses[row].sqrt();
        }
    }

    if !frequencies.iter().all(|f| f.is_finite()) {
        return Err(SolverError::NonFinite("modal analysis"));
    }

    Ok(ModalReport {
        frequencies,
        mode_shapes,
    })
}
