//! Determinacy classification and self-stress localization across fixtures.

use approx::assert_relative_eq;
use tensegrity_solver::prelude::*;

/// Two independent collinear cable pairs, each with its own self-stress mode.
fn two_cable_lines() -> Structure {
    let nodes = vec![
        Node::fixed(-1.0, 0.0, 0.0),
        Node::new(0.0, 0.0, 0.0).with_restraints(false, true, true),
        Node::fixed(1.0, 0.0, 0.0),
        Node::fixed(-1.0, 1.0, 0.0),
        Node::new(0.0, 1.0, 0.0).with_restraints(false, true, true),
        Node::fixed(1.0, 1.0, 0.0),
    ];
    let elements = vec![
        Element::cable(0, 1, 50.0, 70_000.0),
        Element::cable(1, 2, 50.0, 70_000.0),
        Element::cable(3, 4, 50.0, 70_000.0),
        Element::cable(4, 5, 50.0, 70_000.0),
    ];
    Structure::new(nodes, elements).unwrap()
}

fn fixtures() -> Vec<Structure> {
    let truss = {
        let nodes = vec![
            Node::fixed(0.0, 0.0, 0.0),
            Node::new(1.0, 0.0, 1.0).with_restraints(false, true, false),
            Node::fixed(2.0, 0.0, 0.0),
        ];
        let elements = vec![
            Element::bar(0, 1, 2500.0, 10_000.0),
            Element::bar(1, 2, 2500.0, 10_000.0),
        ];
        Structure::new(nodes, elements).unwrap()
    };

    let pyramid = {
        let nodes = vec![
            Node::fixed(1.0, 1.0, 0.0),
            Node::fixed(-1.0, 1.0, 0.0),
            Node::fixed(-1.0, -1.0, 0.0),
            Node::fixed(1.0, -1.0, 0.0),
            Node::new(0.0, 0.0, 1.5),
        ];
        let elements = (0..4)
            .map(|base| Element::bar(base, 4, 100.0, 200_000.0))
            .collect();
        Structure::new(nodes, elements).unwrap()
    };

    let free_middle = {
        let nodes = vec![
            Node::fixed(-1.0, 0.0, 0.0),
            Node::new(0.0, 0.0, 0.0),
            Node::fixed(1.0, 0.0, 0.0),
        ];
        let elements = vec![
            Element::cable(0, 1, 50.0, 70_000.0),
            Element::cable(1, 2, 50.0, 70_000.0),
        ];
        Structure::new(nodes, elements).unwrap()
    };

    vec![truss, pyramid, free_middle, two_cable_lines()]
}

#[test]
fn rank_nullity_holds_on_every_fixture() {
    for structure in fixtures() {
        let report = analyze_determinacy(&structure, 1e-8).unwrap();
        assert_eq!(
            report.rank + report.self_stress_count,
            structure.element_count()
        );
        assert_eq!(
            report.rank + report.mechanism_count,
            structure.free_dofs().len()
        );
        assert_eq!(
            report.singular_values.len(),
            structure.element_count().min(structure.free_dofs().len())
        );
        // Descending singular values
        for i in 1..report.singular_values.len() {
            assert!(report.singular_values[i] <= report.singular_values[i - 1]);
        }
    }
}

#[test]
fn pyramid_with_one_free_node_is_once_redundant() {
    // Four bars meeting at one spatial node: rank 3, one state of self-stress.
    let report = analyze_determinacy(&fixtures()[1], 1e-8).unwrap();
    assert_eq!(report.rank, 3);
    assert_eq!(report.self_stress_count, 1);
    assert_eq!(report.mechanism_count, 0);
}

#[test]
fn localization_separates_independent_lines() {
    let structure = two_cable_lines();
    let report = analyze_determinacy(&structure, 1e-8).unwrap();
    assert_eq!(report.self_stress_count, 2);

    // Force the worst case for the localizer: a dense mix of the two modes.
    let basis = &report.self_stress_modes;
    let mixed = mix_two_columns(basis);
    let localized = localize_self_stress_modes(&mixed, 1e-9, 8);

    // Each localized mode concentrates on a single cable pair.
    for column in localized.column_iter() {
        let touched = column.iter().filter(|v| v.abs() > 1e-8).count();
        assert_eq!(touched, 2);
    }

    // The localized modes still span the self-stress subspace: projecting
    // onto the orthonormal eigenbasis must reproduce them.
    for column in localized.column_iter() {
        let projected = basis * (basis.transpose() * column);
        let residual = (column - projected).norm();
        assert!(
            residual < 1e-8 * column.norm(),
            "localized mode left the self-stress subspace"
        );
    }
}

/// 45° rotation of a two-column basis
fn mix_two_columns(basis: &DMatrix<f64>) -> DMatrix<f64> {
    assert_eq!(basis.ncols(), 2);
    let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
    let mut mixed = basis.clone_owned();
    for row in 0..basis.nrows() {
        mixed[(row, 0)] = inv_sqrt2 * (basis[(row, 0)] + basis[(row, 1)]);
        mixed[(row, 1)] = inv_sqrt2 * (basis[(row, 0)] - basis[(row, 1)]);
    }
    mixed
}

#[test]
fn mechanism_modes_are_inextensional() {
    // For every mechanism d, the elements see no length change to first
    // order: Aᵗ·d = 0 elementwise.
    let structure = fixtures()[2].clone();
    let report = analyze_determinacy(&structure, 1e-8).unwrap();
    assert_eq!(report.mechanism_count, 2);

    let geometry = tensegrity_solver::equilibrium::geometry(&structure).unwrap();
    let a = tensegrity_solver::equilibrium::equilibrium_matrix(&structure, &geometry);
    for column in report.mechanisms.column_iter() {
        let elongations = a.transpose() * column;
        for elongation in elongations.iter() {
            assert_relative_eq!(*elongation, 0.0, epsilon = 1e-10);
        }
    }
}
