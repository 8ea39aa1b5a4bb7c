//! Denavit-Hartenberg chain model and forward kinematics.
//!
//! A [`DhTable`] holds the fixed link geometry of a 6-axis serial arm; a
//! [`ForwardKinematics`] value evaluates the chain, producing the end-effector
//! pose for a joint configuration. Evaluation is a pure function: the same
//! joints always produce the same pose, bit for bit.

use nalgebra::{Matrix3, Matrix4, SVector, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rotation;

/// Number of actuated joints in the arm.
pub const JOINT_COUNT: usize = 6;

/// Joint angles in radians, one per actuated axis.
pub type JointAngles = SVector<f64, JOINT_COUNT>;

/// Position plus Euler orientation, `[x, y, z, roll, pitch, yaw]`.
pub type EulerPose = SVector<f64, 6>;

/// Position plus quaternion orientation, `[x, y, z, w, qx, qy, qz]`.
pub type QuaternionPose = SVector<f64, 7>;

/// Errors constructing a [`Pose`] from raw components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoseError {
    /// A pose slice must have 6 (position + Euler) or 7 (position +
    /// quaternion) components.
    #[error("pose dimension mismatch: expected 6 or 7 components, got {actual}")]
    DimensionMismatch { actual: usize },
}

/// An end-effector pose in either orientation representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Pose {
    /// `[x, y, z, roll, pitch, yaw]`
    Euler(EulerPose),
    /// `[x, y, z, w, qx, qy, qz]`
    Quaternion(QuaternionPose),
}

impl Pose {
    /// Build a pose from a raw slice: 6 components select the Euler form,
    /// 7 the quaternion form.
    pub fn from_slice(values: &[f64]) -> Result<Self, PoseError> {
        match values.len() {
            6 => Ok(Pose::Euler(EulerPose::from_column_slice(values))),
            7 => Ok(Pose::Quaternion(QuaternionPose::from_column_slice(values))),
            actual => Err(PoseError::DimensionMismatch { actual }),
        }
    }

    /// The position component.
    pub fn position(&self) -> Vector3<f64> {
        match self {
            Pose::Euler(p) => Vector3::new(p[0], p[1], p[2]),
            Pose::Quaternion(p) => Vector3::new(p[0], p[1], p[2]),
        }
    }

    /// This pose in the 6-dimensional Euler form.
    pub fn to_euler(&self) -> EulerPose {
        match self {
            Pose::Euler(p) => *p,
            Pose::Quaternion(p) => {
                let q = Vector4::new(p[3], p[4], p[5], p[6]);
                let euler = rotation::matrix_to_euler(&rotation::quaternion_to_matrix(&q));
                SVector::from([p[0], p[1], p[2], euler[0], euler[1], euler[2]])
            }
        }
    }

    /// This pose in the 7-dimensional quaternion form.
    pub fn to_quaternion(&self) -> QuaternionPose {
        match self {
            Pose::Quaternion(p) => *p,
            Pose::Euler(p) => {
                let q = rotation::euler_to_quaternion(&Vector3::new(p[3], p[4], p[5]));
                SVector::from([p[0], p[1], p[2], q[0], q[1], q[2], q[3]])
            }
        }
    }
}

/// Denavit-Hartenberg parameters for the 6-axis chain.
///
/// Four arrays of per-link constants, fixed for the lifetime of the model:
/// `theta_offset` (joint zero reference), `d` (link offset along z), `a`
/// (link length along x), `alpha` (link twist about x). Angles in radians,
/// lengths in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhTable {
    pub theta_offset: [f64; JOINT_COUNT],
    pub d: [f64; JOINT_COUNT],
    pub a: [f64; JOINT_COUNT],
    pub alpha: [f64; JOINT_COUNT],
}

impl DhTable {
    /// Geometry of a representative small 6-axis articulated arm.
    pub fn generic_six_axis() -> Self {
        use std::f64::consts::FRAC_PI_2;
        Self {
            theta_offset: [0.0, -FRAC_PI_2, 0.0, 0.0, 0.0, 0.0],
            d: [0.4, 0.0, 0.0, 0.35, 0.0, 0.08],
            a: [0.025, 0.315, 0.035, 0.0, 0.0, 0.0],
            alpha: [-FRAC_PI_2, 0.0, -FRAC_PI_2, FRAC_PI_2, -FRAC_PI_2, 0.0],
        }
    }

    /// The homogeneous transform of one link at joint angle `theta`:
    /// `Rz(θ + θ₀) · Tz(d) · Tx(a) · Rx(α)`.
    ///
    /// A row of all zeros (and `theta == 0`) yields the identity transform.
    pub fn link_transform(&self, link: usize, theta: f64) -> Matrix4<f64> {
        let (st, ct) = (theta + self.theta_offset[link]).sin_cos();
        let (sa, ca) = self.alpha[link].sin_cos();
        let a = self.a[link];

        Matrix4::new(
            ct,
            -st * ca,
            st * sa,
            a * ct,
            st,
            ct * ca,
            -ct * sa,
            a * st,
            0.0,
            sa,
            ca,
            self.d[link],
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }
}

impl Default for DhTable {
    fn default() -> Self {
        Self::generic_six_axis()
    }
}

/// Forward kinematics evaluator for a [`DhTable`].
#[derive(Debug, Clone)]
pub struct ForwardKinematics {
    dh: DhTable,
}

impl ForwardKinematics {
    pub fn new(dh: DhTable) -> Self {
        Self { dh }
    }

    pub fn dh(&self) -> &DhTable {
        &self.dh
    }

    /// The full end-effector transform for a joint configuration.
    ///
    /// `base` holds angles of upstream externally-commanded axes; each
    /// composes a fixed Z-rotation ahead of the DH chain. The six per-joint
    /// transforms are then left-multiplied in link order starting from
    /// identity.
    pub fn end_effector_transform(&self, base: &[f64], joints: &JointAngles) -> Matrix4<f64> {
        let mut transform = Matrix4::identity();
        for &angle in base {
            transform *= rotation_z_homogeneous(angle);
        }
        for (link, &theta) in joints.iter().enumerate() {
            transform *= self.dh.link_transform(link, theta);
        }
        transform
    }

    /// End-effector pose as position plus Euler angles.
    pub fn pose_euler(&self, base: &[f64], joints: &JointAngles) -> EulerPose {
        let transform = self.end_effector_transform(base, joints);
        let origin = transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let euler = rotation::matrix_to_euler(&rotation_block(&transform));

        SVector::from([origin[0], origin[1], origin[2], euler[0], euler[1], euler[2]])
    }

    /// End-effector pose as position plus unit quaternion.
    pub fn pose_quaternion(&self, base: &[f64], joints: &JointAngles) -> QuaternionPose {
        let transform = self.end_effector_transform(base, joints);
        let origin = transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let q = rotation::matrix_to_quaternion(&rotation_block(&transform));

        SVector::from([origin[0], origin[1], origin[2], q[0], q[1], q[2], q[3]])
    }
}

fn rotation_block(transform: &Matrix4<f64>) -> Matrix3<f64> {
    transform.fixed_view::<3, 3>(0, 0).into_owned()
}

fn rotation_z_homogeneous(angle: f64) -> Matrix4<f64> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0, s, c, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    )
}
