//! Gauss-Newton inverse kinematics.
//!
//! Iterates on the 7-dimensional position + quaternion residual. The system
//! is overdetermined (7 residuals, 6 joints), so each step solves the normal
//! equations `(JᵀJ) Δ = −Jᵀr`. Convergence is declared on the gradient norm
//! ‖Jᵀr‖₂, the stationarity condition of the least-squares problem.
//!
//! The quaternion residual is a plain componentwise difference; since q and
//! −q encode the same rotation, targets are assumed hemisphere-aligned with
//! the pose of the seed configuration.

use std::time::Instant;

use tracing::{debug, trace};

use crate::jacobian;
use crate::kinematics::{ForwardKinematics, JointAngles, Pose};
use crate::linalg;
use crate::solver::{IkSolver, MAX_ITERATIONS, SolverError, SolverResult};

/// Configuration for [`GaussNewton`].
#[derive(Debug, Clone)]
pub struct GaussNewtonConfig {
    /// Maximum number of update steps.
    pub max_iterations: usize,
    /// Convergence threshold on the gradient norm ‖Jᵀr‖₂.
    pub gradient_tolerance: f64,
}

impl Default for GaussNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            gradient_tolerance: 1e-8,
        }
    }
}

/// Gauss-Newton solver on the quaternion-space residual.
#[derive(Debug, Clone)]
pub struct GaussNewton {
    config: GaussNewtonConfig,
}

impl GaussNewton {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GaussNewtonConfig::default())
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: GaussNewtonConfig) -> Self {
        Self { config }
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the gradient-norm convergence threshold.
    pub fn with_gradient_tolerance(mut self, gradient_tolerance: f64) -> Self {
        self.config.gradient_tolerance = gradient_tolerance;
        self
    }
}

impl Default for GaussNewton {
    fn default() -> Self {
        Self::new()
    }
}

impl IkSolver for GaussNewton {
    fn solve(
        &self,
        model: &ForwardKinematics,
        base: &[f64],
        target: &Pose,
        seed: &JointAngles,
    ) -> Result<SolverResult, SolverError> {
        let start = Instant::now();
        let target = target.to_quaternion();
        let residual = |q: &JointAngles| target - model.pose_quaternion(base, q);

        let mut joints = *seed;
        for iteration in 0..self.config.max_iterations {
            let r = residual(&joints);
            let jacobian = jacobian::central_difference(&residual, &joints);
            let gradient_norm = (jacobian.transpose() * r).norm();
            trace!(iteration, gradient_norm, "gauss-newton step");

            if gradient_norm <= self.config.gradient_tolerance {
                let error_norm = r.norm();
                debug!(iterations = iteration, error_norm, "gauss-newton converged");
                return Ok(SolverResult::converged(
                    joints,
                    iteration,
                    error_norm,
                    start.elapsed(),
                ));
            }

            let step = linalg::solve_normal_equations(&jacobian, &(-r))?;
            joints += step;
        }

        Err(SolverError::NonConvergence {
            iterations: self.config.max_iterations,
            error_norm: residual(&joints).norm(),
        })
    }
}
