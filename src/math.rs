//! Mathematical utilities shared by the solvers

use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// Solve `K u = p` subject to `u = 0` on the given DOFs by Lagrange-multiplier
/// augmentation.
///
/// One constraint row/column (an identity selector) is appended per fixed DOF,
/// producing a symmetric (n+f)x(n+f) system. Returns `(u, lambda)` where the
/// multipliers `lambda` are the constraint forces at the fixed DOFs, or `None`
/// when the augmented system is singular.
pub fn solve_constrained(k: &Mat, fixed_dofs: &[usize], rhs: &Vec) -> Option<(Vec, Vec)> {
    let n = k.nrows();
    let f = fixed_dofs.len();

    let mut augmented = Mat::zeros(n + f, n + f);
    augmented.view_mut((0, 0), (n, n)).copy_from(k);
    for (row, &dof) in fixed_dofs.iter().enumerate() {
        augmented[(n + row, dof)] = 1.0;
        augmented[(dof, n + row)] = 1.0;
    }

    let mut b = Vec::zeros(n + f);
    b.rows_mut(0, n).copy_from(rhs);

    let solution = augmented.lu().solve(&b)?;
    let displacements = solution.rows(0, n).into_owned();
    let multipliers = solution.rows(n, f).into_owned();
    Some((displacements, multipliers))
}

/// Reject NaN/Inf before it can propagate into downstream stages.
pub fn ensure_finite(values: &Vec, stage: &'static str) -> SolverResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::NonFinite(stage))
    }
}

/// Largest absolute value over the selected DOFs.
pub fn max_abs_at(values: &Vec, dofs: &[usize]) -> f64 {
    dofs.iter().fold(0.0_f64, |m, &d| m.max(values[d].abs()))
}

/// Largest absolute value over the whole vector.
pub fn max_abs(values: &Vec) -> f64 {
    values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}
