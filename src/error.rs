//! Error types for the arm-solver library.
//!
//! Each module defines its own error enum; this module aggregates them into
//! one top-level type with `From` conversions so callers can use a single
//! result alias across the crate.

use thiserror::Error;

use crate::kinematics::PoseError;
use crate::linalg::LinAlgError;
use crate::solver::SolverError;

/// Main result type used throughout the arm-solver library.
pub type ArmResult<T> = Result<T, ArmSolverError>;

/// Main error type for the arm-solver library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArmSolverError {
    /// Linear algebra kernel failure.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(#[from] LinAlgError),

    /// Malformed pose input.
    #[error("pose error: {0}")]
    Pose(#[from] PoseError),

    /// Inverse kinematics failure.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
}
