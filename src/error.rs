//! Error types for the solver

use thiserror::Error;

/// Main error type for solver operations
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("element {element} references node {index} but the structure has {count} nodes")]
    NodeIndexOutOfRange {
        element: usize,
        index: usize,
        count: usize,
    },

    #[error("element {0} connects a node to itself")]
    DegenerateElement(usize),

    #[error("element {element}: {what} must be {requirement}, got {value}")]
    InvalidProperty {
        element: usize,
        what: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no restrained axis - a fully free structure has no unique equilibrium")]
    NoRestraint,

    #[error("element {0} has zero current length")]
    ZeroLength(usize),

    #[error("step count must be at least 1")]
    ZeroSteps,

    #[error("singular tangent stiffness after perturbation retry - structure may be a mechanism")]
    SingularStiffness,

    #[error("nodal mass must be positive on free DOFs, node {0}")]
    MassNotPositive(usize),

    #[error("non-finite value produced during {0}")]
    NonFinite(&'static str),
}

/// Result type for solver operations
pub type SolverResult<T> = Result<T, SolverError>;
