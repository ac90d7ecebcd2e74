//! Tensegrity Solver Example - prestressed cable line, staged analysis

use anyhow::Result;
use tensegrity_solver::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Tensegrity Solver Example: Prestressed Cable Line ===\n");

    // Two cables between fixed anchors, middle node free.
    //
    //     A0 ======== N1 ======== A2
    //    (-2,0,0)   (0,0,0)    (2,0,0)
    //
    let nodes = vec![
        Node::fixed(-2.0, 0.0, 0.0),
        Node::new(0.0, 0.0, 0.0).with_restraints(false, true, false),
        Node::fixed(2.0, 0.0, 0.0),
    ];
    // E = 70 000 MPa, A = π·4² mm² (8 mm rod)
    let area = std::f64::consts::PI * 16.0;
    let elements = vec![
        Element::cable(0, 1, area, 70_000.0).with_free_length(2.0),
        Element::cable(1, 2, area, 70_000.0).with_free_length(2.0),
    ];
    let structure = Structure::new(nodes, elements)?;

    // Determinacy of the as-built state
    let report = analyze_determinacy(&structure, 1e-8)?;
    println!(
        "Determinacy: rank={}, self-stress modes={}, mechanisms={}",
        report.rank, report.self_stress_count, report.mechanism_count
    );
    if report.self_stress_count > 0 {
        let localized = localize_self_stress_modes(&report.self_stress_modes, 1e-9, 8);
        println!("Localized self-stress basis:\n{localized:.4}");
    }

    // Stage 1: prestress by shortening both free lengths 1 mm, solved by
    // dynamic relaxation.
    println!("\nStage 1: prestress (free-length shortening 1 mm per cable)");
    let zero_loads = DVector::zeros(structure.dof_count());
    let shortening = DVector::from_vec(vec![-0.001, -0.001]);
    let prestressed = solve_relaxation(
        &structure,
        &zero_loads,
        Some(&shortening),
        &RelaxationConfig::default(),
    )?;
    println!(
        "  converged={} after {} steps / {} energy resets",
        prestressed.status.converged,
        prestressed.status.time_steps,
        prestressed.status.energy_resets
    );
    println!(
        "  cable tensions: {:.1} N / {:.1} N",
        prestressed.results.tensions[0], prestressed.results.tensions[1]
    );

    // Stage 2: transverse point load on the prestressed state, solved by the
    // incremental displacement method on the chained snapshot.
    println!("\nStage 2: transverse load -200 N at the middle node");
    let mut loads = DVector::zeros(structure.dof_count());
    loads[5] = -200.0;
    let loaded = solve_nonlinear(
        &prestressed.structure,
        &loads,
        None,
        100,
        &LinearOptions::default(),
    )?;
    let sag = loaded.results.node_displacement(1);
    println!(
        "  completed {} of {} sub-steps",
        loaded.status.completed_steps, loaded.status.requested_steps
    );
    println!("  middle node sag: {:.4} m", sag[2]);
    println!(
        "  cable tensions: {:.1} N / {:.1} N",
        loaded.results.tensions[0], loaded.results.tensions[1]
    );
    println!(
        "  anchor reactions (z): {:.1} N / {:.1} N",
        loaded.results.node_reaction(0)[2],
        loaded.results.node_reaction(2)[2]
    );

    // Natural frequencies of the loaded state (1 kg lumped at the middle).
    let modal = analyze_modes(&loaded.structure, &[0.0, 1.0, 0.0], &[0.0, 0.0], Some(3))?;
    println!("\nNatural frequencies of the loaded state:");
    for (mode, frequency) in modal.frequencies.iter().enumerate() {
        println!("  mode {}: {:.2} Hz", mode + 1, frequency);
    }

    println!("\nResults (JSON):");
    println!("{}", serde_json::to_string_pretty(&loaded.results)?);

    Ok(())
}
