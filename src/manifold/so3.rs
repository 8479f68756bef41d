//! SO(3) - Special Orthogonal Group in 3D
//!
//! SO(3) elements are represented using nalgebra's UnitQuaternion internally.
//! Only the group operations required by SE(3) compounding are provided here.

use crate::manifold::{LieGroup, ManifoldError, ManifoldResult};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use std::fmt;

/// SO(3) group element representing rotations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    /// Internal representation as a unit quaternion
    quaternion: UnitQuaternion<f64>,
}

impl fmt::Display for SO3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quaternion.quaternion();
        write!(
            f,
            "SO3(quaternion: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            q.w, q.i, q.j, q.k
        )
    }
}

impl SO3 {
    /// Create a new SO(3) element from a unit quaternion.
    pub fn new(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Create SO(3) from Euler angles (roll, pitch, yaw).
    pub fn from_euler_angles(roll: f64, pitch: f64, yaw: f64) -> Self {
        SO3::new(UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Create SO(3) from scaled axis (axis-angle vector).
    pub fn from_scaled_axis(axis_angle: Vector3<f64>) -> Self {
        SO3::new(UnitQuaternion::from_scaled_axis(axis_angle))
    }

    /// Create SO(3) from a 3x3 rotation matrix.
    ///
    /// Fails when the matrix is not orthonormal or has a negative determinant.
    ///
    /// # Arguments
    /// * `matrix` - Candidate rotation matrix
    /// * `tolerance` - Maximum allowed deviation of RᵀR from the identity
    pub fn from_rotation_matrix(matrix: &Matrix3<f64>, tolerance: f64) -> ManifoldResult<Self> {
        let orthogonality_error = (matrix.transpose() * matrix - Matrix3::identity()).norm();
        if orthogonality_error > tolerance {
            return Err(ManifoldError::InvalidElement(format!(
                "rotation block is not orthonormal (|RᵀR - I| = {orthogonality_error:.3e})"
            )));
        }
        let det = matrix.determinant();
        if (det - 1.0).abs() > tolerance {
            return Err(ManifoldError::InvalidElement(format!(
                "rotation block has determinant {det:.6}, expected +1"
            )));
        }
        let rotation = Rotation3::from_matrix_unchecked(*matrix);
        Ok(SO3::new(UnitQuaternion::from_rotation_matrix(&rotation)))
    }

    /// Get the quaternion representation.
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Get the rotation matrix (3x3).
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }
}

impl LieGroup for SO3 {
    type Element = SO3;
    type JacobianMatrix = Matrix3<f64>;

    const DIM: usize = 3;
    const DOF: usize = 3;
    const REP_SIZE: usize = 4;

    fn identity() -> Self::Element {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    /// SO3 inverse.
    ///
    /// # Notes
    /// R⁻¹ = Rᵀ, for quaternions: q⁻¹ = q*
    ///
    /// J_R⁻¹_R = -Adj(R) = -R
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self::Element {
        if let Some(jac) = jacobian {
            *jac = -self.rotation_matrix();
        }

        SO3 {
            quaternion: self.quaternion.inverse(),
        }
    }

    /// SO3 composition.
    ///
    /// # Notes
    /// J_QR_Q = Rᵀ (R being the right operand)
    /// J_QR_R = I
    fn compose(
        &self,
        other: &Self::Element,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self::Element {
        if let Some(jac_self) = jacobian_self {
            *jac_self = other.rotation_matrix().transpose();
        }

        if let Some(jac_other) = jacobian_other {
            *jac_other = Matrix3::identity();
        }

        SO3 {
            quaternion: self.quaternion * other.quaternion,
        }
    }

    fn between(&self, other: &Self::Element) -> Self::Element {
        self.inverse(None).compose(other, None, None)
    }

    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * vector
    }

    fn adjoint(&self) -> Self::JacobianMatrix {
        self.rotation_matrix()
    }

    fn random() -> Self::Element {
        SO3 {
            quaternion: UnitQuaternion::from_scaled_axis(Vector3::new(
                rand::random::<f64>() * 2.0 - 1.0,
                rand::random::<f64>() * 2.0 - 1.0,
                rand::random::<f64>() * 2.0 - 1.0,
            )),
        }
    }

    fn normalize(&mut self) {
        self.quaternion.renormalize();
    }

    fn is_valid(&self, tolerance: f64) -> bool {
        let q = self.quaternion.quaternion();
        (q.norm() - 1.0).abs() < tolerance
    }
}
