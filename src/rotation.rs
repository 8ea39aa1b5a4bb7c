//! Rotation representation conversions.
//!
//! The kinematics chain produces rotation matrices; solver targets arrive as
//! Euler angles or quaternions. This module converts between the three
//! representations.
//!
//! Conventions:
//! - Euler angles are ZYX intrinsic (yaw-pitch-roll), stored as
//!   `[roll, pitch, yaw]` in radians.
//! - Quaternions are stored `[w, x, y, z]` with `w` the scalar part, always
//!   unit length on output.

use nalgebra::{Matrix3, Vector3, Vector4};

/// Below this value of c₂ = √(r₀₀² + r₁₀²) the Euler extraction switches to
/// its gimbal-lock branch.
const GIMBAL_EPSILON: f64 = 1e-3;

/// Quaternion norms below this are treated as degenerate.
const NORM_EPSILON: f64 = 1e-12;

/// Convert `[roll, pitch, yaw]` Euler angles to a unit quaternion `[w, x, y, z]`.
///
/// Half-angle composition in the ZYX convention. `euler_to_quaternion(&Vector3::zeros())`
/// is the identity rotation `[1, 0, 0, 0]`.
pub fn euler_to_quaternion(euler: &Vector3<f64>) -> Vector4<f64> {
    let (sr, cr) = (euler[0] * 0.5).sin_cos();
    let (sp, cp) = (euler[1] * 0.5).sin_cos();
    let (sy, cy) = (euler[2] * 0.5).sin_cos();

    Vector4::new(
        cr * cp * cy + sr * sp * sy,
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
    )
}

/// Convert `[roll, pitch, yaw]` Euler angles to a rotation matrix.
///
/// Composes `Rz(yaw) · Ry(pitch) · Rx(roll)`.
pub fn euler_to_matrix(euler: &Vector3<f64>) -> Matrix3<f64> {
    let (sr, cr) = euler[0].sin_cos();
    let (sp, cp) = euler[1].sin_cos();
    let (sy, cy) = euler[2].sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

/// Extract `[roll, pitch, yaw]` Euler angles from a rotation matrix.
///
/// When c₂ = √(r₀₀² + r₁₀²) falls below the singularity threshold the matrix
/// is in gimbal lock (pitch at ±π/2); roll and yaw are then no longer
/// separable and yaw is pinned to zero.
pub fn matrix_to_euler(r: &Matrix3<f64>) -> Vector3<f64> {
    let c2 = (r[(0, 0)] * r[(0, 0)] + r[(1, 0)] * r[(1, 0)]).sqrt();
    let pitch = (-r[(2, 0)]).atan2(c2);

    if c2 > GIMBAL_EPSILON {
        let roll = r[(2, 1)].atan2(r[(2, 2)]);
        let yaw = r[(1, 0)].atan2(r[(0, 0)]);
        Vector3::new(roll, pitch, yaw)
    } else {
        let roll = (-r[(1, 2)]).atan2(r[(1, 1)]);
        Vector3::new(roll, pitch, 0.0)
    }
}

/// Extract a unit quaternion `[w, x, y, z]` from a rotation matrix.
///
/// Trace-based four-case branch selection: the branch anchored on the largest
/// diagonal term keeps the divisor away from zero, which keeps the extraction
/// stable near ±180° rotations.
pub fn matrix_to_quaternion(m: &Matrix3<f64>) -> Vector4<f64> {
    let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];

    if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0; // s = 4w
        Vector4::new(
            0.25 * s,
            (m[(2, 1)] - m[(1, 2)]) / s,
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(1, 0)] - m[(0, 1)]) / s,
        )
    } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
        let s = (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.0; // s = 4x
        Vector4::new(
            (m[(2, 1)] - m[(1, 2)]) / s,
            0.25 * s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
        )
    } else if m[(1, 1)] > m[(2, 2)] {
        let s = (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.0; // s = 4y
        Vector4::new(
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            0.25 * s,
            (m[(1, 2)] + m[(2, 1)]) / s,
        )
    } else {
        let s = (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.0; // s = 4z
        Vector4::new(
            (m[(1, 0)] - m[(0, 1)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            0.25 * s,
        )
    }
}

/// Convert a quaternion `[w, x, y, z]` to a rotation matrix.
///
/// The input is normalized first; a degenerate (near-zero-norm) quaternion
/// maps to the identity rotation.
pub fn quaternion_to_matrix(q: &Vector4<f64>) -> Matrix3<f64> {
    let norm = q.norm();
    if norm < NORM_EPSILON {
        return Matrix3::identity();
    }
    let q = q / norm;
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);

    Matrix3::new(
        1.0 - 2.0 * (y * y + z * z),
        2.0 * (x * y - w * z),
        2.0 * (x * z + w * y),
        2.0 * (x * y + w * z),
        1.0 - 2.0 * (x * x + z * z),
        2.0 * (y * z - w * x),
        2.0 * (x * z - w * y),
        2.0 * (y * z + w * x),
        1.0 - 2.0 * (x * x + y * y),
    )
}
