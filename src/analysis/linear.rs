//! Linear Displacement Method
//!
//! Solves one linearized increment: assemble the tangent stiffness at the
//! current configuration, impose the supports by Lagrange-multiplier
//! augmentation, translate free-length variations into equivalent nodal
//! loads, solve, and post-process tensions against the pre-step geometry.
//!
//! A singular solve (common for untensioned mechanisms at their undeformed
//! configuration) is retried once after a small deterministic perturbation of
//! the free DOFs of the geometry; a second failure is fatal.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::{assemble_tangent_stiffness, axial_stiffness, ResidualTolerance};
use crate::equilibrium;
use crate::error::{SolverError, SolverResult};
use crate::math::{self, Vec as DVec};
use crate::model::Structure;
use crate::results::Results;

/// Options for the linear solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearOptions {
    /// Coordinate perturbation applied to the free DOFs when the tangent
    /// stiffness is singular (m)
    pub perturbation: f64,
    /// Residual tolerance backing the `equilibrium` flag
    pub tolerance: ResidualTolerance,
}

impl Default for LinearOptions {
    fn default() -> Self {
        Self {
            perturbation: 1e-5,
            tolerance: ResidualTolerance::default(),
        }
    }
}

/// Successor snapshot plus the results of one increment
#[derive(Debug, Clone)]
pub struct LinearOutcome {
    /// The structure displaced, retensioned and with varied free lengths
    pub structure: Structure,
    pub results: Results,
}

/// Solve a single linearized increment of `loads` (N, 3n) and optional
/// free-length variations (m, one per element).
pub fn solve_linear(
    structure: &Structure,
    loads: &DVec,
    length_changes: Option<&DVec>,
    options: &LinearOptions,
) -> SolverResult<LinearOutcome> {
    check_shapes(structure, loads, length_changes)?;

    match attempt(structure, loads, length_changes, options) {
        Err(SolverError::SingularStiffness) => {
            warn!(
                "singular tangent stiffness, retrying with {} m geometry perturbation",
                options.perturbation
            );
            let mut nudge = DVec::zeros(structure.dof_count());
            for dof in structure.free_dofs() {
                nudge[dof] = options.perturbation;
            }
            let perturbed = structure.with_displacements(&nudge)?;
            attempt(&perturbed, loads, length_changes, options)
        }
        other => other,
    }
}

fn check_shapes(
    structure: &Structure,
    loads: &DVec,
    length_changes: Option<&DVec>,
) -> SolverResult<()> {
    if loads.len() != structure.dof_count() {
        return Err(SolverError::DimensionMismatch {
            what: "load vector",
            expected: structure.dof_count(),
            actual: loads.len(),
        });
    }
    if let Some(changes) = length_changes {
        if changes.len() != structure.element_count() {
            return Err(SolverError::DimensionMismatch {
                what: "free length variation",
                expected: structure.element_count(),
                actual: changes.len(),
            });
        }
    }
    Ok(())
}

fn attempt(
    structure: &Structure,
    loads: &DVec,
    length_changes: Option<&DVec>,
    options: &LinearOptions,
) -> SolverResult<LinearOutcome> {
    let geometry = equilibrium::geometry(structure)?;
    let a = equilibrium::equilibrium_matrix(structure, &geometry);
    let k = assemble_tangent_stiffness(structure, &geometry);

    // A free-length variation, with the nodes momentarily held, locks a
    // fictitious axial force t0 = -(EA/l0)·dl into the element; its nodal
    // forces are superimposed onto the external load.
    let element_count = structure.element_count();
    let mut locked = DVec::zeros(element_count);
    if let Some(changes) = length_changes {
        for (e, element) in structure.elements().iter().enumerate() {
            if changes[e] != 0.0 {
                let rigidity = element.axial_rigidity();
                if rigidity > 0.0 {
                    locked[e] = -rigidity * changes[e] / element.free_length;
                }
            }
        }
    }
    let mut rhs = loads.clone();
    if length_changes.is_some() {
        rhs -= &a * &locked;
    }

    let fixed = structure.fixed_dofs();
    let (displacements, multipliers) = match math::solve_constrained(&k, &fixed, &rhs) {
        Some(solution) => solution,
        None => return Err(SolverError::SingularStiffness),
    };
    math::ensure_finite(&displacements, "linear displacement solve")?;

    // The multipliers are the constraint forces; the support reactions are
    // their negation.
    let mut reactions = DVec::zeros(structure.dof_count());
    for (row, &dof) in fixed.iter().enumerate() {
        reactions[dof] = -multipliers[row];
    }

    // Tension from the tangent stiffness and the local displacement projected
    // on the pre-step cosines, not from elastic elongation: a linearized step
    // is evaluated against the geometry it was assembled on.
    let mut tensions = DVec::zeros(element_count);
    let mut increments = DVec::zeros(element_count);
    for (e, element) in structure.elements().iter().enumerate() {
        let s = axial_stiffness(geometry.flexibilities[e]);
        let force_density = element.tension / geometry.lengths[e];
        let (ia, ib) = (3 * element.end_a, 3 * element.end_b);
        let elongation: f64 = (0..3)
            .map(|axis| {
                geometry.cosines[(e, axis)] * (displacements[ib + axis] - displacements[ia + axis])
            })
            .sum();
        increments[e] = (s + force_density) * elongation + locked[e];
        tensions[e] = element.tension + increments[e];
    }
    math::ensure_finite(&tensions, "linear tension recovery")?;

    let resisting = &a * &tensions;
    let free = structure.free_dofs();
    let mut residual = DVec::zeros(structure.dof_count());
    let unbalanced = loads - &a * &increments;
    for &dof in &free {
        residual[dof] = unbalanced[dof];
    }
    let equilibrium_flag = options
        .tolerance
        .satisfied(math::max_abs_at(&residual, &free), math::max_abs(loads));

    let mut next = structure
        .with_displacements(&displacements)?
        .with_tensions(&tensions)?;
    if let Some(changes) = length_changes {
        next = next.with_free_length_changes(changes)?;
    }

    Ok(LinearOutcome {
        structure: next,
        results: Results {
            displacements,
            reactions,
            resisting_forces: resisting,
            residual,
            tensions,
            equilibrium: equilibrium_flag,
        },
    })
}
