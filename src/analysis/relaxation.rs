//! Dynamic Relaxation
//!
//! Explicit pseudo-dynamic solver for equilibrium states the tangent-stiffness
//! methods cannot reach: slack or strongly nonlinear assemblies where the
//! stiffness may be singular. Each free DOF carries a fictitious mass derived
//! from its stiffness contribution; the unbalanced load accelerates the nodes,
//! and energy is dissipated by kinetic damping: whenever the kinetic energy
//! passes a peak, all velocities are zeroed and the trajectory restarts from
//! rest near the static minimum.
//!
//! Tension is recomputed every iteration from the elongation relative to the
//! free length with the tension/compression-asymmetric stiffness, so slack
//! cables genuinely carry nothing.
//!
//! Non-convergence (step or reset budget exhausted) is reported through the
//! status counters, never as an error; the caller decides fatality.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::ResidualTolerance;
use crate::equilibrium;
use crate::error::{SolverError, SolverResult};
use crate::math::{self, Vec as DVec};
use crate::model::Structure;
use crate::results::Results;

/// Configuration of the explicit integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationConfig {
    /// Integration time step (s)
    pub time_step: f64,
    /// Scale on the stiffness-derived fictitious masses; larger is more
    /// stable, smaller converges faster
    pub mass_amplification: f64,
    /// Floor on the fictitious nodal mass, guarding lightly-connected DOFs
    pub minimum_mass: f64,
    /// Time-step budget before giving up
    pub max_time_steps: usize,
    /// Kinetic-energy reset budget before giving up
    pub max_energy_resets: usize,
    /// Residual tolerance for convergence
    pub tolerance: ResidualTolerance,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            mass_amplification: 2.0,
            minimum_mass: 0.005,
            max_time_steps: 10_000,
            max_energy_resets: 1_000,
            tolerance: ResidualTolerance::default(),
        }
    }
}

/// Convergence counters of one relaxation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxationStatus {
    /// Residual within tolerance when the run stopped
    pub converged: bool,
    /// Time steps integrated
    pub time_steps: usize,
    /// Kinetic-energy resets performed
    pub energy_resets: usize,
}

/// Converged (or abandoned) snapshot, results, and counters
#[derive(Debug, Clone)]
pub struct RelaxationOutcome {
    pub structure: Structure,
    pub results: Results,
    pub status: RelaxationStatus,
}

/// Relax the structure under `loads` (N, 3n) and optional free-length
/// variations (m, one per element) until the unbalanced load is within
/// tolerance or a budget runs out.
pub fn solve_relaxation(
    structure: &Structure,
    loads: &DVec,
    length_changes: Option<&DVec>,
    config: &RelaxationConfig,
) -> SolverResult<RelaxationOutcome> {
    if loads.len() != structure.dof_count() {
        return Err(SolverError::DimensionMismatch {
            what: "load vector",
            expected: structure.dof_count(),
            actual: loads.len(),
        });
    }

    let working = match length_changes {
        Some(changes) => structure.with_free_length_changes(changes)?,
        None => structure.clone(),
    };

    let dof_count = working.dof_count();
    let element_count = working.element_count();
    let free = working.free_dofs();
    let fixed = working.fixed_dofs();
    let connectivity = working.connectivity();
    let load_reference = math::max_abs(loads);
    let dt = config.time_step;

    let initial_coordinates = working.coordinate_matrix();
    let mut coordinates = initial_coordinates.clone();
    let mut velocities = DVec::zeros(dof_count);
    let mut tensions = DVec::zeros(element_count);
    let mut resisting = DVec::zeros(dof_count);
    let mut residual = DVec::zeros(dof_count);
    let mut rigidities = vec![0.0; element_count];

    let mut previous_energy = 0.0;
    let mut steps = 0;
    let mut resets = 0;
    let converged;

    loop {
        let geometry = equilibrium::geometry_at(&working, &coordinates, &connectivity)?;

        // Elongation-based tension with asymmetric stiffness; the slack side
        // carries nothing.
        for (e, element) in working.elements().iter().enumerate() {
            let elongation = geometry.lengths[e] - element.free_length;
            let rigidity = element.modulus.active(elongation) * element.area.active(elongation);
            rigidities[e] = rigidity;
            tensions[e] = if rigidity > 0.0 {
                rigidity * elongation / element.free_length
            } else {
                0.0
            };
        }

        let a = equilibrium::equilibrium_matrix(&working, &geometry);
        resisting.copy_from(&(&a * &tensions));
        for &dof in &free {
            residual[dof] = loads[dof] - resisting[dof];
        }

        let residual_max = math::max_abs_at(&residual, &free);
        if config.tolerance.satisfied(residual_max, load_reference) {
            converged = true;
            break;
        }
        if steps >= config.max_time_steps || resets >= config.max_energy_resets {
            converged = false;
            break;
        }

        // Fictitious masses from the diagonal tangent-stiffness contribution
        // of each free DOF, floored at the configured minimum.
        let mut diagonal = DVec::zeros(dof_count);
        for (e, element) in working.elements().iter().enumerate() {
            let stiffness = if rigidities[e] > 0.0 {
                rigidities[e] / element.free_length
            } else {
                0.0
            };
            let force_density = (tensions[e] / geometry.lengths[e]).max(0.0);
            for axis in 0..3 {
                let contribution =
                    stiffness * geometry.cosines[(e, axis)].powi(2) + force_density;
                diagonal[3 * element.end_a + axis] += contribution;
                diagonal[3 * element.end_b + axis] += contribution;
            }
        }

        let mut kinetic_energy = 0.0;
        for &dof in &free {
            let mass =
                (config.mass_amplification * 0.5 * dt * dt * diagonal[dof]).max(config.minimum_mass);
            velocities[dof] += residual[dof] / mass * dt;
            kinetic_energy += 0.5 * mass * velocities[dof] * velocities[dof];
        }
        for &dof in &free {
            coordinates[(dof / 3, dof % 3)] += velocities[dof] * dt;
        }
        steps += 1;

        // Kinetic damping: restart from rest just past each energy peak.
        if kinetic_energy < previous_energy {
            velocities.fill(0.0);
            previous_energy = 0.0;
            resets += 1;
        } else {
            previous_energy = kinetic_energy;
        }

        if steps % 1000 == 0 {
            debug!("relaxation step {steps}: residual {residual_max:.3e} N, {resets} resets");
        }
    }

    math::ensure_finite(&tensions, "relaxation tension recovery")?;

    let final_structure = working
        .with_coordinate_matrix(&coordinates)?
        .with_tensions(&tensions)?;

    let mut displacements = DVec::zeros(dof_count);
    for dof in 0..dof_count {
        displacements[dof] =
            coordinates[(dof / 3, dof % 3)] - initial_coordinates[(dof / 3, dof % 3)];
    }
    math::ensure_finite(&displacements, "relaxation displacement recovery")?;

    let reactions = equilibrium::support_reactions(&resisting, loads, &fixed);

    Ok(RelaxationOutcome {
        structure: final_structure,
        results: Results {
            displacements,
            reactions,
            resisting_forces: resisting,
            residual,
            tensions,
            equilibrium: converged,
        },
        status: RelaxationStatus {
            converged,
            time_steps: steps,
            energy_resets: resets,
        },
    })
}
