//! Dense fixed-size linear algebra kernel.
//!
//! Every system solved during inverse kinematics is a small dense matrix with
//! dimensions known at compile time, so the kernel works on statically sized
//! `nalgebra` types. Shape errors are a compile-time concern; the runtime
//! failure mode that remains is a (near-)singular system matrix, which every
//! entry point reports explicitly instead of letting a zero pivot leak
//! `NaN`/`Inf` into the solve.
//!
//! Provided operations:
//! - [`solve`]: Gaussian elimination without pivoting
//! - [`invert`]: matrix inverse built on the same elimination
//! - [`pseudo_inverse`]: Moore-Penrose left pseudo-inverse (JᵀJ)⁻¹Jᵀ
//! - [`solve_normal_equations`] / [`solve_damped_normal_equations`]: the
//!   Gauss-Newton and damped-least-squares kernels (JᵀJ + λ²I)x = Jᵀb

use nalgebra::{SMatrix, SVector};
use thiserror::Error;

/// Pivot magnitudes below this are treated as zero.
const PIVOT_EPSILON: f64 = 1e-12;

/// Errors produced by the linear algebra kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinAlgError {
    /// The system matrix is not invertible: elimination found a pivot too
    /// close to zero at the given row.
    #[error("singular system matrix: pivot {pivot:.3e} at row {row}")]
    SingularMatrix { row: usize, pivot: f64 },
}

/// Solve the square system `A x = b` by Gaussian elimination.
///
/// Elimination runs without row exchanges; a pivot with magnitude below the
/// internal threshold aborts with [`LinAlgError::SingularMatrix`].
pub fn solve<const N: usize>(
    a: &SMatrix<f64, N, N>,
    b: &SVector<f64, N>,
) -> Result<SVector<f64, N>, LinAlgError> {
    let mut m = *a;
    let mut rhs = *b;

    // Forward elimination.
    for k in 0..N {
        let pivot = m[(k, k)];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(LinAlgError::SingularMatrix { row: k, pivot });
        }
        for i in (k + 1)..N {
            let factor = m[(i, k)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..N {
                m[(i, j)] -= factor * m[(k, j)];
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    // Back substitution.
    let mut x = SVector::<f64, N>::zeros();
    for k in (0..N).rev() {
        let mut sum = rhs[k];
        for j in (k + 1)..N {
            sum -= m[(k, j)] * x[j];
        }
        x[k] = sum / m[(k, k)];
    }

    Ok(x)
}

/// Invert a square matrix by solving against each identity column.
pub fn invert<const N: usize>(
    a: &SMatrix<f64, N, N>,
) -> Result<SMatrix<f64, N, N>, LinAlgError> {
    let mut inverse = SMatrix::<f64, N, N>::zeros();
    for col in 0..N {
        let mut e = SVector::<f64, N>::zeros();
        e[col] = 1.0;
        let x = solve(a, &e)?;
        inverse.set_column(col, &x);
    }
    Ok(inverse)
}

/// Moore-Penrose left pseudo-inverse `(JᵀJ)⁻¹Jᵀ`.
///
/// Fails with [`LinAlgError::SingularMatrix`] when `JᵀJ` is not invertible,
/// which happens whenever `J` is rank-deficient.
pub fn pseudo_inverse<const M: usize, const N: usize>(
    j: &SMatrix<f64, M, N>,
) -> Result<SMatrix<f64, N, M>, LinAlgError> {
    let jt = j.transpose();
    let jtj = jt * j;
    Ok(invert(&jtj)? * jt)
}

/// Solve the normal equations `(JᵀJ) x = Jᵀ b` for the least-squares problem
/// `min ‖J x − b‖²`.
pub fn solve_normal_equations<const M: usize, const N: usize>(
    j: &SMatrix<f64, M, N>,
    b: &SVector<f64, M>,
) -> Result<SVector<f64, N>, LinAlgError> {
    let jt = j.transpose();
    solve(&(jt * j), &(jt * b))
}

/// Solve the damped normal equations `(JᵀJ + λ²I) x = Jᵀ b`.
///
/// The λ²I term keeps the system invertible near rank deficiencies of `J`;
/// with `damping == 0` this reduces to [`solve_normal_equations`].
pub fn solve_damped_normal_equations<const M: usize, const N: usize>(
    j: &SMatrix<f64, M, N>,
    b: &SVector<f64, M>,
    damping: f64,
) -> Result<SVector<f64, N>, LinAlgError> {
    let jt = j.transpose();
    let h = jt * j + SMatrix::<f64, N, N>::identity() * (damping * damping);
    solve(&h, &(jt * b))
}
