//! Tensegrity Solver - structural analysis for pin-jointed assemblies
//!
//! This library analyzes bar-and-cable structures (trusses, cable nets,
//! tensegrity) built from pin-jointed axial elements with
//! tension/compression-asymmetric stiffness. It provides:
//! - Linear displacement method (single linearized increment)
//! - Nonlinear displacement method (incremental re-linearization)
//! - Dynamic relaxation (explicit solver with kinetic damping)
//! - Equilibrium-matrix determinacy analysis with self-stress localization
//! - Lumped-mass modal analysis
//!
//! Every solver consumes an immutable [`model::Structure`] snapshot and
//! returns a successor snapshot, so staged analyses (prestress stage, then
//! load stage) chain naturally.
//!
//! ## Example
//! ```rust
//! use tensegrity_solver::prelude::*;
//!
//! // Symmetric two-bar truss, loaded at the apex.
//! let nodes = vec![
//!     Node::fixed(0.0, 0.0, 0.0),
//!     Node::new(1.0, 0.0, 1.0).with_restraints(false, true, false),
//!     Node::fixed(2.0, 0.0, 0.0),
//! ];
//! let elements = vec![
//!     Element::bar(0, 1, 2500.0, 10_000.0), // area mm², modulus MPa
//!     Element::bar(1, 2, 2500.0, 10_000.0),
//! ];
//! let structure = Structure::new(nodes, elements).unwrap();
//!
//! let mut loads = DVector::zeros(structure.dof_count());
//! loads[5] = -100_000.0; // apex, z axis (N)
//!
//! let outcome = solve_linear(&structure, &loads, None, &LinearOptions::default()).unwrap();
//! assert!(outcome.results.equilibrium);
//! assert!((outcome.results.displacements[5] + 5.6568e-3).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod equilibrium;
pub mod error;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::linear::{solve_linear, LinearOptions, LinearOutcome};
    pub use crate::analysis::modal::{analyze_modes, ModalReport};
    pub use crate::analysis::nonlinear::{solve_nonlinear, NonlinearOutcome, NonlinearStatus};
    pub use crate::analysis::relaxation::{
        solve_relaxation, RelaxationConfig, RelaxationOutcome, RelaxationStatus,
    };
    pub use crate::analysis::svd::{
        analyze_determinacy, localize_self_stress_modes, DeterminacyReport,
    };
    pub use crate::analysis::ResidualTolerance;
    pub use crate::equilibrium::Geometry;
    pub use crate::error::{SolverError, SolverResult};
    pub use crate::model::{Element, ElementKind, Node, SideValues, Structure};
    pub use crate::results::Results;
    pub use nalgebra::{DMatrix, DVector};
}
