//! Newton-Raphson inverse kinematics.
//!
//! Iterates on the 6-dimensional position + Euler residual, solving the full
//! linearized system `J Δ = −r` each step. Fast near a well-conditioned
//! solution; the linear solve fails outright where the Jacobian is singular.

use std::time::Instant;

use tracing::{debug, trace};

use crate::jacobian;
use crate::kinematics::{ForwardKinematics, JointAngles, Pose};
use crate::linalg;
use crate::solver::{IkSolver, MAX_ITERATIONS, SolverError, SolverResult};

/// Configuration for [`NewtonRaphson`].
#[derive(Debug, Clone)]
pub struct NewtonRaphsonConfig {
    /// Maximum number of update steps.
    pub max_iterations: usize,
    /// Convergence threshold on the residual norm ‖r‖₂.
    pub tolerance: f64,
}

impl Default for NewtonRaphsonConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: 1e-2,
        }
    }
}

/// Newton-Raphson solver on the Euler-space residual.
#[derive(Debug, Clone)]
pub struct NewtonRaphson {
    config: NewtonRaphsonConfig,
}

impl NewtonRaphson {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(NewtonRaphsonConfig::default())
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: NewtonRaphsonConfig) -> Self {
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
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        Self::new()
    }
}

impl IkSolver for NewtonRaphson {
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
            trace!(iteration, error_norm, "newton-raphson step");

            if error_norm <= self.config.tolerance {
                debug!(iterations = iteration, error_norm, "newton-raphson converged");
                return Ok(SolverResult::converged(
                    joints,
                    iteration,
                    error_norm,
                    start.elapsed(),
                ));
            }

            let jacobian = jacobian::central_difference(&residual, &joints);
            let step = linalg::solve(&jacobian, &(-r))?;
            joints += step;
        }

        Err(SolverError::NonConvergence {
            iterations: self.config.max_iterations,
            error_norm: residual(&joints).norm(),
        })
    }
}
