//! Connectivity-based geometry and the equilibrium matrix
//!
//! Everything here is derived from the current configuration: element
//! difference vectors come from the sparse product C·coordinates, lengths and
//! direction cosines from the difference vectors, and the equilibrium matrix
//! A (3n×b) from the cosines scattered through the connectivity pattern. A
//! maps element tensions to the nodal loads they balance, so the unbalanced
//! load at the free DOFs is p − A_free·t.

use nalgebra_sparse::CsrMatrix;

use crate::error::{SolverError, SolverResult};
use crate::math::{Mat, Vec as DVec};
use crate::model::Structure;

/// Per-element quantities derived from the current configuration
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Current element lengths (m)
    pub lengths: DVec,
    /// Unit direction cosines end_a → end_b, one row per element
    pub cosines: Mat,
    /// Axial flexibilities free_length/(E·A) (m/N), +inf when the active
    /// side carries nothing
    pub flexibilities: DVec,
}

/// Derive geometry from the structure's own coordinates.
pub fn geometry(structure: &Structure) -> SolverResult<Geometry> {
    let connectivity = structure.connectivity();
    geometry_at(structure, &structure.coordinate_matrix(), &connectivity)
}

/// Derive geometry at an explicit coordinate state (used by the iterative
/// solvers while they move nodes).
pub fn geometry_at(
    structure: &Structure,
    coordinates: &Mat,
    connectivity: &CsrMatrix<f64>,
) -> SolverResult<Geometry> {
    let count = structure.element_count();
    let mut difference = Mat::zeros(count, 3);
    for (element, node, &sign) in connectivity.triplet_iter() {
        for axis in 0..3 {
            difference[(element, axis)] += sign * coordinates[(node, axis)];
        }
    }

    let mut lengths = DVec::zeros(count);
    let mut cosines = Mat::zeros(count, 3);
    for e in 0..count {
        let length = (difference[(e, 0)].powi(2)
            + difference[(e, 1)].powi(2)
            + difference[(e, 2)].powi(2))
        .sqrt();
        if length < 1e-12 {
            return Err(SolverError::ZeroLength(e));
        }
        lengths[e] = length;
        for axis in 0..3 {
            cosines[(e, axis)] = difference[(e, axis)] / length;
        }
    }

    let flexibilities = DVec::from_iterator(
        count,
        structure.elements().iter().map(|element| element.flexibility()),
    );

    Ok(Geometry {
        lengths,
        cosines,
        flexibilities,
    })
}

/// Build the equilibrium matrix A (3n×b): column e carries −u_e at the
/// `end_a` rows and +u_e at the `end_b` rows, interleaved [x, y, z] per node.
pub fn equilibrium_matrix(structure: &Structure, geometry: &Geometry) -> Mat {
    let mut a = Mat::zeros(structure.dof_count(), structure.element_count());
    for (e, element) in structure.elements().iter().enumerate() {
        for axis in 0..3 {
            let u = geometry.cosines[(e, axis)];
            a[(3 * element.end_a + axis, e)] = -u;
            a[(3 * element.end_b + axis, e)] = u;
        }
    }
    a
}

/// Row restriction of a matrix to the given DOF indices.
pub fn restrict_rows(matrix: &Mat, dofs: &[usize]) -> Mat {
    Mat::from_fn(dofs.len(), matrix.ncols(), |i, j| matrix[(dofs[i], j)])
}

/// Recover support reactions from the resisting forces A·t: the reaction on a
/// fixed DOF is what the supports must add to the applied load to match the
/// force the tensioned elements transmit there. Free DOFs get zero.
pub fn support_reactions(resisting: &DVec, loads: &DVec, fixed_dofs: &[usize]) -> DVec {
    let mut reactions = DVec::zeros(resisting.len());
    for &dof in fixed_dofs {
        reactions[dof] = resisting[dof] - loads[dof];
    }
    reactions
}
