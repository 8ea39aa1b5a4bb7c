//! Iterative inverse kinematics solvers.
//!
//! Three variants share one iteration scheme over the pose residual
//! r(q) = target − fk(q), with the Jacobian estimated by central differences
//! each iteration:
//!
//! | Solver | Error space | Update | Tolerance |
//! |---|---|---|---|
//! | [`NewtonRaphson`] | position + Euler (6) | solve `J Δ = −r` | `‖r‖₂ < 1e-2` |
//! | [`GaussNewton`] | position + quaternion (7) | `(JᵀJ) Δ = −Jᵀr` | `‖Jᵀr‖₂ < 1e-8` |
//! | [`DampedLeastSquares`] | position + Euler (6) | `Δ = −α (JᵀJ + λ²I)⁻¹ Jᵀr` | `‖r‖₂ < 1e-1` |
//!
//! The variants trade convergence robustness against speed: plain
//! Newton-Raphson is fastest away from singularities, damped least squares
//! keeps stepping where the Jacobian loses rank.
//!
//! A solve either converges (returning the joint vector with the third-axis
//! zero-reference correction applied) or exhausts the iteration cap and
//! reports [`SolverError::NonConvergence`]. Callers wanting the legacy
//! give-up-and-return-the-seed behavior use
//! [`IkSolver::solve_with_fallback`].

use std::fmt;
use std::time::Duration;

use rayon::prelude::*;
use tracing::warn;

use crate::kinematics::{ForwardKinematics, JointAngles, Pose};
use crate::linalg::LinAlgError;
use thiserror::Error;

pub mod damped_least_squares;
pub mod gauss_newton;
pub mod newton_raphson;

pub use damped_least_squares::{DampedLeastSquares, DampedLeastSquaresConfig};
pub use gauss_newton::{GaussNewton, GaussNewtonConfig};
pub use newton_raphson::{NewtonRaphson, NewtonRaphsonConfig};

/// Hard cap on solver iterations.
pub const MAX_ITERATIONS: usize = 150;

/// Zero-reference correction applied to the third joint of a converged
/// solution: the modeled arm's elbow zero sits a quarter turn from the DH
/// zero.
pub const THIRD_AXIS_CORRECTION: f64 = -std::f64::consts::FRAC_PI_2;

/// Errors produced by the inverse kinematics solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The iteration cap was exhausted before the residual dropped below
    /// tolerance. Typically the target is unreachable for the arm's geometry
    /// or the seed is too far from a solution.
    #[error("no convergence after {iterations} iterations (residual norm {error_norm:.3e})")]
    NonConvergence { iterations: usize, error_norm: f64 },

    /// A linear system inside an iteration was singular.
    #[error(transparent)]
    LinearAlgebra(#[from] LinAlgError),
}

/// Selects one of the solver variants at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Newton-Raphson on the Euler-space residual.
    NewtonRaphson,
    /// Gauss-Newton on the quaternion-space residual.
    GaussNewton,
    /// Damped least squares on the Euler-space residual (robust near
    /// singularities).
    #[default]
    DampedLeastSquares,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::NewtonRaphson => write!(f, "Newton-Raphson"),
            SolverKind::GaussNewton => write!(f, "Gauss-Newton"),
            SolverKind::DampedLeastSquares => write!(f, "damped least squares"),
        }
    }
}

/// A converged inverse kinematics solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    /// Solved joint angles, third-axis correction applied.
    pub joints: JointAngles,
    /// Update steps taken before convergence.
    pub iterations: usize,
    /// Residual norm at convergence.
    pub error_norm: f64,
    /// Wall time of the solve.
    pub elapsed: Duration,
}

impl SolverResult {
    pub(crate) fn converged(
        mut joints: JointAngles,
        iterations: usize,
        error_norm: f64,
        elapsed: Duration,
    ) -> Self {
        joints[2] += THIRD_AXIS_CORRECTION;
        Self {
            joints,
            iterations,
            error_norm,
            elapsed,
        }
    }

    /// The fixed prefix joints concatenated with the solved joints, the
    /// full machine configuration.
    pub fn concatenated(&self, base: &[f64]) -> Vec<f64> {
        base.iter().copied().chain(self.joints.iter().copied()).collect()
    }
}

/// Common interface of the inverse kinematics solvers.
pub trait IkSolver {
    /// Solve for the joint angles reaching `target`.
    ///
    /// `base` is the fixed joint prefix (upstream axes, never optimized) and
    /// `seed` the initial guess for the six solved joints.
    fn solve(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        target: &Pose,
        seed: &JointAngles,
    ) -> Result<SolverResult, SolverError>;

    /// Legacy solve surface: on any failure, log a warning and hand back the
    /// unmodified seed.
    fn solve_with_fallback(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        target: &Pose,
        seed: &JointAngles,
    ) -> JointAngles {
        match self.solve(model, base, target, seed) {
            Ok(solution) => solution.joints,
            Err(error) => {
                warn!(%error, "inverse kinematics gave up, returning initial guess");
                *seed
            }
        }
    }

    /// Solve many independent target/seed pairs across the rayon pool.
    ///
    /// Each pair is an isolated solve; results come back in request order.
    fn solve_batch(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        requests: &[(Pose, JointAngles)],
    ) -> Vec<Result<SolverResult, SolverError>>
    where
        Self: Sync,
    {
        requests
            .par_iter()
            .map(|(target, seed)| self.solve(model, base, target, seed))
            .collect()
    }
}

/// Enum wrapper over the solver variants for runtime selection.
pub enum AnySolver {
    NewtonRaphson(NewtonRaphson),
    GaussNewton(GaussNewton),
    DampedLeastSquares(DampedLeastSquares),
}

impl AnySolver {
    /// Create the solver for `kind` with its default configuration.
    pub fn new(kind: SolverKind) -> Self {
        match kind {
            SolverKind::NewtonRaphson => AnySolver::NewtonRaphson(NewtonRaphson::new()),
            SolverKind::GaussNewton => AnySolver::GaussNewton(GaussNewton::new()),
            SolverKind::DampedLeastSquares => {
                AnySolver::DampedLeastSquares(DampedLeastSquares::new())
            }
        }
    }
}

impl From<SolverKind> for AnySolver {
    fn from(kind: SolverKind) -> Self {
        Self::new(kind)
    }
}

impl IkSolver for AnySolver {
    fn solve(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        target: &Pose,
        seed: &JointAngles,
    ) -> Result<SolverResult, SolverError> {
        match self {
            AnySolver::NewtonRaphson(solver) => solver.solve(model, base, target, seed),
            AnySolver::GaussNewton(solver) => solver.solve(model, base, target, seed),
            AnySolver::DampedLeastSquares(solver) => solver.solve(model, base, target, seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_solver_kind_display() {
        assert_eq!(SolverKind::NewtonRaphson.to_string(), "Newton-Raphson");
        assert_eq!(SolverKind::GaussNewton.to_string(), "Gauss-Newton");
        assert_eq!(
            SolverKind::DampedLeastSquares.to_string(),
            "damped least squares"
        );
    }

    #[test]
    fn test_default_kind_is_damped_least_squares() {
        assert_eq!(SolverKind::default(), SolverKind::DampedLeastSquares);
    }

    #[test]
    fn test_converged_applies_third_axis_correction() {
        let joints = JointAngles::from([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let result = SolverResult::converged(joints, 3, 1e-4, Duration::ZERO);

        assert_eq!(result.joints[2], 0.3 - FRAC_PI_2);
        assert_eq!(result.joints[0], 0.1);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_concatenated_prepends_base() {
        let joints = JointAngles::from([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let result = SolverResult::converged(joints, 0, 0.0, Duration::ZERO);

        let full = result.concatenated(&[1.5, -0.5]);

        assert_eq!(full.len(), 8);
        assert_eq!(full[0], 1.5);
        assert_eq!(full[1], -0.5);
        assert_eq!(full[4], -FRAC_PI_2);
    }
}
