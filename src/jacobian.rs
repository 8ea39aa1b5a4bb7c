//! Central-difference Jacobian estimation.
//!
//! The inverse kinematics solvers linearize the pose residual at each
//! iteration by estimating its Jacobian numerically. The estimate perturbs
//! each input component independently:
//!
//! `J[i][j] = (f(x + δe_j)[i] − f(x − δe_j)[i]) / (2δ)`
//!
//! Cost is two evaluations of `f` per input component. There is no adaptive
//! step sizing: δ is fixed at [`DEFAULT_STEP`], tuned for joint angles in
//! radians and pose residuals in meters/radians. Callers working on other
//! scales use [`central_difference_with_step`].

use nalgebra::{SMatrix, SVector};

/// Finite-difference step for [`central_difference`].
pub const DEFAULT_STEP: f64 = 1e-8;

/// Estimate the Jacobian of `f` at `x` with the default step.
pub fn central_difference<F, const M: usize, const N: usize>(
    f: F,
    x: &SVector<f64, N>,
) -> SMatrix<f64, M, N>
where
    F: Fn(&SVector<f64, N>) -> SVector<f64, M>,
{
    central_difference_with_step(f, x, DEFAULT_STEP)
}

/// Estimate the Jacobian of `f` at `x` with an explicit step size.
pub fn central_difference_with_step<F, const M: usize, const N: usize>(
    f: F,
    x: &SVector<f64, N>,
    step: f64,
) -> SMatrix<f64, M, N>
where
    F: Fn(&SVector<f64, N>) -> SVector<f64, M>,
{
    let mut jacobian = SMatrix::<f64, M, N>::zeros();
    for j in 0..N {
        let mut forward = *x;
        let mut backward = *x;
        forward[j] += step;
        backward[j] -= step;

        let column = (f(&forward) - f(&backward)) / (2.0 * step);
        jacobian.set_column(j, &column);
    }
    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2, SMatrix, Vector2, Vector3};

    #[test]
    fn test_linear_function_exact() {
        // For f(x) = A x the central difference is exact up to rounding.
        let a = Matrix2::new(2.0, -1.0, 0.5, 3.0);
        let f = |x: &Vector2<f64>| a * x;

        let jacobian = central_difference(f, &Vector2::new(0.7, -0.3));

        assert!((jacobian - a).norm() < 1e-6);
    }

    #[test]
    fn test_nonlinear_function_matches_analytic() {
        // f(x, y) = [x², x·y, sin(y)]
        let f = |v: &Vector2<f64>| Vector3::new(v[0] * v[0], v[0] * v[1], v[1].sin());
        let x = Vector2::new(1.5, 0.8);

        let estimate = central_difference(f, &x);
        let analytic = SMatrix::<f64, 3, 2>::new(
            2.0 * x[0],
            0.0,
            x[1],
            x[0],
            0.0,
            x[1].cos(),
        );

        assert!((estimate - analytic).norm() < 1e-6);
    }

    #[test]
    fn test_step_sizes_agree() {
        let f = |v: &Vector2<f64>| Vector2::new(v[0].exp() * v[1], v[0] - v[1] * v[1]);
        let x = Vector2::new(0.2, -0.4);

        let fine = central_difference_with_step(f, &x, 1e-8);
        let coarse = central_difference_with_step(f, &x, 1e-6);

        // Both estimates approximate the same derivative; their disagreement
        // is bounded by the truncation error of the coarser step.
        assert!((fine - coarse).norm() < 1e-5);
    }
}
