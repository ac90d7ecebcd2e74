//! Nonlinear Displacement Method
//!
//! Approximates large-displacement response by splitting the total increment
//! into equal sub-increments and re-linearizing: each sub-step runs the
//! linear solver on the already-deformed, retensioned snapshot produced by
//! the previous one. There is no inner residual-correction loop per step;
//! accuracy improves monotonically with the step count.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::linear::{solve_linear, LinearOptions};
use crate::error::{SolverError, SolverResult};
use crate::math::Vec as DVec;
use crate::model::Structure;
use crate::results::Results;

/// Progress of the incremental scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonlinearStatus {
    /// Sub-increments actually applied
    pub completed_steps: usize,
    /// Sub-increments requested
    pub requested_steps: usize,
    /// All requested sub-increments were applied
    pub converged: bool,
}

/// Final snapshot, accumulated results, and progress counters
#[derive(Debug, Clone)]
pub struct NonlinearOutcome {
    pub structure: Structure,
    pub results: Results,
    pub status: NonlinearStatus,
}

/// Apply `loads` (N, 3n) and optional free-length variations (m, one per
/// element) in `steps` equal sub-increments, updating geometry and tension
/// after each.
///
/// A sub-step whose tangent stiffness stays singular even after the
/// perturbation fallback stops the scheme early; that is reported through
/// the status counters, not as an error.
pub fn solve_nonlinear(
    structure: &Structure,
    loads: &DVec,
    length_changes: Option<&DVec>,
    steps: usize,
    options: &LinearOptions,
) -> SolverResult<NonlinearOutcome> {
    if steps == 0 {
        return Err(SolverError::ZeroSteps);
    }

    let fraction = 1.0 / steps as f64;
    let step_loads = loads.scale(fraction);
    let step_changes = length_changes.map(|changes| changes.scale(fraction));

    let mut current = structure.clone();
    let mut displacements = DVec::zeros(structure.dof_count());
    let mut reactions = DVec::zeros(structure.dof_count());
    let mut last: Option<Results> = None;
    let mut completed = 0;

    for step in 0..steps {
        match solve_linear(&current, &step_loads, step_changes.as_ref(), options) {
            Ok(outcome) => {
                displacements += &outcome.results.displacements;
                reactions += &outcome.results.reactions;
                current = outcome.structure;
                last = Some(outcome.results);
                completed += 1;
            }
            Err(SolverError::SingularStiffness) => {
                warn!("nonlinear scheme stopped at sub-step {step}: singular sub-step");
                break;
            }
            Err(error) => return Err(error),
        }
    }

    let results = match last {
        Some(last) => Results {
            displacements,
            reactions,
            resisting_forces: last.resisting_forces,
            residual: last.residual,
            tensions: last.tensions,
            equilibrium: completed == steps && last.equilibrium,
        },
        None => Results {
            displacements,
            reactions,
            resisting_forces: DVec::zeros(structure.dof_count()),
            residual: DVec::zeros(structure.dof_count()),
            tensions: current.tensions(),
            equilibrium: false,
        },
    };

    Ok(NonlinearOutcome {
        structure: current,
        results,
        status: NonlinearStatus {
            completed_steps: completed,
            requested_steps: steps,
            converged: completed == steps,
        },
    })
}
