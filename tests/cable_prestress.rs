//! Golden scenarios on a two-cable line between fixed anchors: prestress by
//! free-length shortening, then a transverse load on the chained snapshot.
//!
//! The converged prestress tension has the closed form E·A·Δl/l0 with
//! l0 = 1.999 m, and the transverse response satisfies the scalar equation
//! 2·t(w)·w/L(w) = P, solved here by bisection for cross-validation.

use approx::assert_relative_eq;
use tensegrity_solver::prelude::*;

const MODULUS: f64 = 70_000.0; // MPa
fn area() -> f64 {
    std::f64::consts::PI * 16.0 // mm², 8 mm rod
}
fn rigidity() -> f64 {
    MODULUS * area() // N
}

/// Anchors at x = ±2 m, middle node free in x and z.
fn cable_line(middle: [f64; 3]) -> Structure {
    let nodes = vec![
        Node::fixed(-2.0, 0.0, 0.0),
        Node::new(middle[0], middle[1], middle[2]).with_restraints(false, true, false),
        Node::fixed(2.0, 0.0, 0.0),
    ];
    let elements = vec![
        Element::cable(0, 1, area(), MODULUS).with_free_length(2.0),
        Element::cable(1, 2, area(), MODULUS).with_free_length(2.0),
    ];
    Structure::new(nodes, elements).unwrap()
}

#[test]
fn relaxation_converges_to_the_prestress_closed_form() {
    // Start the middle node off-center; the symmetric shortening must pull
    // it back to the center.
    let structure = cable_line([0.05, 0.0, 0.1]);
    let loads = DVector::zeros(structure.dof_count());
    let shortening = DVector::from_vec(vec![-0.001, -0.001]);
    let config = RelaxationConfig::default();

    let outcome = solve_relaxation(&structure, &loads, Some(&shortening), &config).unwrap();

    assert!(outcome.status.converged);
    assert!(outcome.status.time_steps < config.max_time_steps);
    assert!(outcome.status.energy_resets < config.max_energy_resets);
    assert!(outcome.results.equilibrium);

    // t = E·A·0.001/1.999 in both cables
    let expected = rigidity() * 0.001 / 1.999;
    assert_relative_eq!(outcome.results.tensions[0], expected, max_relative = 1e-4);
    assert_relative_eq!(outcome.results.tensions[1], expected, max_relative = 1e-4);

    // Middle node re-centered
    let middle = outcome.structure.nodes()[1];
    assert!(middle.x.abs() < 1e-6);
    assert!(middle.z.abs() < 1e-4);

    // Anchors are pulled inward by the prestress
    assert_relative_eq!(
        outcome.results.node_reaction(0)[0],
        -expected,
        max_relative = 1e-3
    );
    assert_relative_eq!(
        outcome.results.node_reaction(2)[0],
        expected,
        max_relative = 1e-3
    );
}

#[test]
fn linear_prestress_matches_the_locked_in_tension() {
    // With the middle node centered and only x free, the equivalent loads of
    // a symmetric shortening cancel: no displacement, pure tension.
    let nodes = vec![
        Node::fixed(-2.0, 0.0, 0.0),
        Node::new(0.0, 0.0, 0.0).with_restraints(false, true, true),
        Node::fixed(2.0, 0.0, 0.0),
    ];
    let elements = vec![
        Element::cable(0, 1, area(), MODULUS).with_free_length(2.0),
        Element::cable(1, 2, area(), MODULUS).with_free_length(2.0),
    ];
    let structure = Structure::new(nodes, elements).unwrap();

    let loads = DVector::zeros(structure.dof_count());
    let shortening = DVector::from_vec(vec![-0.001, -0.001]);
    let outcome = solve_linear(
        &structure,
        &loads,
        Some(&shortening),
        &LinearOptions::default(),
    )
    .unwrap();

    assert!(outcome.results.equilibrium);
    assert!(outcome.results.max_displacement() < 1e-12);

    // Linearized against the pre-step free length of 2.0 m
    let expected = rigidity() * 0.001 / 2.0;
    assert_relative_eq!(outcome.results.tensions[0], expected, max_relative = 1e-9);
    assert_relative_eq!(outcome.results.tensions[1], expected, max_relative = 1e-9);

    // The successor snapshot carries the varied free lengths.
    for element in outcome.structure.elements() {
        assert_relative_eq!(element.free_length, 1.999, epsilon = 1e-12);
    }
}

/// Transverse equilibrium of the shortened line: 2·t(w)·w/L(w) = P with
/// L = sqrt(4 + w²) and t = E·A·(L − 1.999)/1.999, solved by bisection.
fn transverse_sag_closed_form(load: f64) -> f64 {
    let balance = |w: f64| {
        let length = (4.0 + w * w).sqrt();
        let tension = rigidity() * (length - 1.999) / 1.999;
        2.0 * tension * w / length - load
    };
    let (mut low, mut high) = (1e-9, 1.0);
    assert!(balance(low) < 0.0 && balance(high) > 0.0);
    while high - low > 1e-12 {
        let mid = 0.5 * (low + high);
        if balance(mid) < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}

fn prestressed_line() -> Structure {
    let structure = cable_line([0.0, 0.0, 0.0]);
    let loads = DVector::zeros(structure.dof_count());
    let shortening = DVector::from_vec(vec![-0.001, -0.001]);
    let outcome = solve_relaxation(
        &structure,
        &loads,
        Some(&shortening),
        &RelaxationConfig::default(),
    )
    .unwrap();
    assert!(outcome.status.converged);
    outcome.structure
}

#[test]
fn incremental_scheme_tracks_the_closed_form_sag() {
    let prestressed = prestressed_line();
    let mut loads = DVector::zeros(prestressed.dof_count());
    loads[5] = -200.0;

    let outcome = solve_nonlinear(&prestressed, &loads, None, 100, &LinearOptions::default())
        .unwrap();
    assert!(outcome.status.converged);
    assert_eq!(outcome.status.completed_steps, 100);

    let expected_sag = transverse_sag_closed_form(200.0);
    let sag = -outcome.results.node_displacement(1)[2];
    assert_relative_eq!(sag, expected_sag, max_relative = 0.05);

    let length = (4.0 + expected_sag * expected_sag).sqrt();
    let expected_tension = rigidity() * (length - 1.999) / 1.999;
    assert_relative_eq!(outcome.results.tensions[0], expected_tension, max_relative = 0.05);
    assert_relative_eq!(outcome.results.tensions[1], expected_tension, max_relative = 0.05);
}

#[test]
fn relaxation_agrees_with_the_closed_form_sag() {
    let prestressed = prestressed_line();
    let mut loads = DVector::zeros(prestressed.dof_count());
    loads[5] = -200.0;

    let outcome =
        solve_relaxation(&prestressed, &loads, None, &RelaxationConfig::default()).unwrap();
    assert!(outcome.status.converged);

    let expected_sag = transverse_sag_closed_form(200.0);
    let sag = -outcome.results.node_displacement(1)[2];
    assert_relative_eq!(sag, expected_sag, max_relative = 1e-4);

    // Converged equilibrium: residual within tolerance against the load.
    assert!(outcome.results.max_residual() < 2e-3);
}
