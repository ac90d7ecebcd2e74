//! Equilibrium-matrix decomposition: static/kinematic determinacy,
//! self-stress modes, mechanisms, and self-stress localization
//!
//! The free-DOF equilibrium matrix A_free (n_free×b) is decomposed by
//! singular values. Its right null space spans the self-stress modes
//! (tension distributions in equilibrium with zero external load); its left
//! null space spans the mechanisms (inextensional displacement modes). The
//! decomposition is computed from the symmetric eigenproblems of AᵗA and AAᵗ:
//! nalgebra's SVD is thin and omits exactly the null-space columns needed
//! here, while the Gram-matrix route yields complete orthonormal bases with
//! the same singular values.

use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};

use crate::equilibrium;
use crate::error::SolverResult;
use crate::math::{Mat, Vec as DVec};
use crate::model::Structure;

/// Rank and null-space report of the equilibrium matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterminacyReport {
    /// Rank r of the free-DOF equilibrium matrix
    pub rank: usize,
    /// Static indeterminacy s = b − r
    pub self_stress_count: usize,
    /// Kinematic indeterminacy m = n_free − r
    pub mechanism_count: usize,
    /// Singular values, descending, min(n_free, b) of them
    pub singular_values: DVec,
    /// Self-stress modes as columns (b×s), orthonormal
    pub self_stress_modes: Mat,
    /// Mechanisms as columns, re-embedded into the full 3n DOF space with
    /// zeros at fixed DOFs
    pub mechanisms: Mat,
}

/// Classify the structure at its current configuration. `zero_tolerance` is
/// the fraction of the largest singular value below which a singular value
/// counts as zero.
pub fn analyze_determinacy(
    structure: &Structure,
    zero_tolerance: f64,
) -> SolverResult<DeterminacyReport> {
    let geometry = equilibrium::geometry(structure)?;
    let a = equilibrium::equilibrium_matrix(structure, &geometry);
    let free = structure.free_dofs();
    let a_free = equilibrium::restrict_rows(&a, &free);

    let element_count = structure.element_count();
    let free_count = free.len();
    let min_dim = element_count.min(free_count);

    let right = SymmetricEigen::new(a_free.transpose() * &a_free);
    let right_order = descending(&right.eigenvalues);

    let singular_values = DVec::from_iterator(
        min_dim,
        right_order
            .iter()
            .take(min_dim)
            .map(|&i| right.eigenvalues[i].max(0.0).sqrt()),
    );
    let sigma_max = if min_dim > 0 { singular_values[0] } else { 0.0 };
    let rank = if sigma_max > 0.0 {
        singular_values
            .iter()
            .filter(|&&sigma| sigma >= zero_tolerance * sigma_max)
            .count()
    } else {
        0
    };

    // Right null space: the b − r trailing eigenvectors of AᵗA.
    let self_stress_count = element_count - rank;
    let mut self_stress_modes = Mat::zeros(element_count, self_stress_count);
    for (column, &i) in right_order.iter().skip(rank).enumerate() {
        self_stress_modes.set_column(column, &right.eigenvectors.column(i).into_owned());
    }

    // Left null space: the n_free − r trailing eigenvectors of AAᵗ,
    // re-embedded over the full DOF vector.
    let left = SymmetricEigen::new(&a_free * a_free.transpose());
    let left_order = descending(&left.eigenvalues);
    let mechanism_count = free_count - rank;
    let mut mechanisms = Mat::zeros(structure.dof_count(), mechanism_count);
    for (column, &i) in left_order.iter().skip(rank).enumerate() {
        for (row, &dof) in free.iter().enumerate() {
            mechanisms[(dof, column)] = left.eigenvectors[(row, i)];
        }
    }

    Ok(DeterminacyReport {
        rank,
        self_stress_count,
        mechanism_count,
        singular_values,
        self_stress_modes,
        mechanisms,
    })
}

fn descending(eigenvalues: &DVec) -> Vec<usize> {
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));
    order
}

/// Re-express a self-stress basis (modes as columns) so each mode is
/// concentrated on as few elements as possible, which aids physical
/// actuatability.
///
/// Iterative pivot elimination: every pass picks, per mode, its
/// largest-magnitude entry and eliminates that entry from every other mode.
/// Only combinations within the basis are taken, so the span is preserved;
/// passes repeat until the count of non-negligible entries stops improving
/// or the pass budget is exhausted. Modes are normalized to unit maximum
/// magnitude. This is a heuristic, not a proven optimum.
pub fn localize_self_stress_modes(modes: &Mat, zero_tolerance: f64, max_passes: usize) -> Mat {
    let (rows, count) = modes.shape();
    let mut basis = modes.clone_owned();
    if count == 0 || rows == 0 {
        return basis;
    }

    normalize_columns(&mut basis);
    let mut best = significant_entries(&basis, zero_tolerance);

    for _ in 0..max_passes {
        for i in 0..count {
            let mut pivot_row = 0;
            let mut pivot = 0.0_f64;
            for row in 0..rows {
                if basis[(row, i)].abs() > pivot.abs() {
                    pivot = basis[(row, i)];
                    pivot_row = row;
                }
            }
            if pivot.abs() <= zero_tolerance {
                continue;
            }
            for j in 0..count {
                if j == i {
                    continue;
                }
                let factor = basis[(pivot_row, j)] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for row in 0..rows {
                    let value = basis[(row, i)];
                    basis[(row, j)] -= factor * value;
                }
                basis[(pivot_row, j)] = 0.0;
            }
        }

        normalize_columns(&mut basis);
        let count_now = significant_entries(&basis, zero_tolerance);
        if count_now >= best {
            break;
        }
        best = count_now;
    }

    basis
}

fn normalize_columns(basis: &mut Mat) {
    for mut column in basis.column_iter_mut() {
        let peak = column.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if peak > 0.0 {
            column /= peak;
        }
    }
}

fn significant_entries(basis: &Mat, zero_tolerance: f64) -> usize {
    basis.iter().filter(|v| v.abs() > zero_tolerance).count()
}
