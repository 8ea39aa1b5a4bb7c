//! Damped-least-squares (Levenberg-Marquardt style) inverse kinematics.
//!
//! Iterates on the 6-dimensional position + Euler residual with the update
//! `Δ = −α (JᵀJ + λ²I)⁻¹ Jᵀ r`. The λ²I term keeps the system solvable
//! through kinematic singularities where plain Newton-Raphson breaks down,
//! and the step scale α trades per-iteration progress for stability. The
//! bias this introduces is paid back in robustness near singular
//! configurations.

use std::time::Instant;

use tracing::{debug, trace};

use crate::jacobian;
use crate::kinematics::{ForwardKinematics, JointAngles, Pose};
use crate::linalg;
use crate::solver::{IkSolver, MAX_ITERATIONS, SolverError, SolverResult};

/// Configuration for [`DampedLeastSquares`].
#[derive(Debug, Clone)]
pub struct DampedLeastSquaresConfig {
    /// Maximum number of update steps.
    pub max_iterations: usize,
    /// Convergence threshold on the residual norm ‖r‖₂.
    pub tolerance: f64,
    /// Damping factor λ.
    pub damping: f64,
    /// Step scale α applied to each solved increment.
    pub step_scale: f64,
}

impl Default for DampedLeastSquaresConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: 1e-1,
            damping: 0.1,
            step_scale: 0.1,
        }
    }
}

/// Damped-least-squares solver on the Euler-space residual.
#[derive(Debug, Clone)]
pub struct DampedLeastSquares {
    config: DampedLeastSquaresConfig,
}

impl DampedLeastSquares {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DampedLeastSquaresConfig::default())
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: DampedLeastSquaresConfig) -> Self {
        Self { config }
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the residual-norm convergence threshold.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the damping factor λ.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.config.damping = damping;
        self
    }

    /// Set the step scale α.
    pub fn with_step_scale(mut self, step_scale: f64) -> Self {
        self.config.step_scale = step_scale;
        self
    }
}

impl Default for DampedLeastSquares {
    fn default() -> Self {
        Self::new()
    }
}

impl IkSolver for DampedLeastSquares {
    fn solve(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        target: &Pose,
        seed: &JointAngles,
    ) -> Result<SolverResult, SolverError> {
        let start = Instant::now();
        let target = target.to_euler();
        let residual = |q: &JointAngles| target - model.pose_euler(base, q);

        let mut joints = *seed;
        for iteration in 0..self.config.max_iterations {
            let r = residual(&joints);
            let error_norm = r.norm();
            trace!(iteration, error_norm, "damped-least-squares step");

            if error_norm <= self.config.tolerance {
                debug!(
                    iterations = iteration,
                    error_norm, "damped least squares converged"
                );
                return Ok(SolverResult::converged(
                    joints,
                    iteration,
                    error_norm,
                    start.elapsed(),
                ));
            }

            let jacobian = jacobian::central_difference(&residual, &joints);
            let step =
                linalg::solve_damped_normal_equations(&jacobian, &(-r), self.config.damping)?;
            joints += step * self.config.step_scale;
        }

        Err(SolverError::NonConvergence {
            iterations: self.config.max_iterations,
            error_norm: residual(&joints).norm(),
        })
    }
}
