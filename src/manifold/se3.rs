//! SE(3) - Special Euclidean Group in 3D
//!
//! SE(3) elements are represented as a combination of SO(3) rotation and Vector3 translation.
//! SE(3) tangent elements are ordered as ξ = [theta(3), rho(3)], where theta is the
//! rotational component and rho is the translational component. This is the ordering
//! used by every covariance in the crate.
//!
//! The optional Jacobians of `compose` and `inverse` are not needed by compounding;
//! they are there for callers that linearize pose chains themselves.

use crate::manifold::so3::SO3;
use crate::manifold::{LieGroup, ManifoldError, ManifoldResult, skew};
use nalgebra::{
    Isometry3, Matrix3, Matrix4, Matrix6, Quaternion, Translation3, UnitQuaternion, Vector3,
    Vector6,
};
use std::fmt;

/// Tolerance used when validating homogeneous matrices.
pub const RIGID_TOLERANCE: f64 = 1e-9;

/// SE(3) group element representing rigid body transformations in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    /// Rotation part as SO(3) element
    rotation: SO3,
    /// Translation part as Vector3
    translation: Vector3<f64>,
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation();
        let q = self.rotation_quaternion();
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            t.x, t.y, t.z, q.w, q.i, q.j, q.k
        )
    }
}

impl Default for SE3 {
    fn default() -> Self {
        SE3::identity()
    }
}

/// SE(3) tangent space element in the ordering ξ = (θ, ρ).
#[derive(Clone, Debug, PartialEq)]
pub struct SE3Tangent {
    /// Internal data: [theta_x, theta_y, theta_z, rho_x, rho_y, rho_z]
    data: Vector6<f64>,
}

impl fmt::Display for SE3Tangent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let theta = self.theta();
        let rho = self.rho();
        write!(
            f,
            "se3(theta: [{:.4}, {:.4}, {:.4}], rho: [{:.4}, {:.4}, {:.4}])",
            theta.x, theta.y, theta.z, rho.x, rho.y, rho.z
        )
    }
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    ///
    /// # Arguments
    /// * `translation` - Translation vector [x, y, z]
    /// * `rotation` - Unit quaternion representing rotation
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        SE3 {
            rotation: SO3::new(rotation),
            translation,
        }
    }

    /// Create SE3 from translation components and quaternion coefficients.
    pub fn from_translation_quaternion(
        x: f64,
        y: f64,
        z: f64,
        qw: f64,
        qx: f64,
        qy: f64,
        qz: f64,
    ) -> Self {
        let translation = Vector3::new(x, y, z);
        let quaternion =
            UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz).normalize());
        Self::new(translation, quaternion)
    }

    /// Create SE3 from translation components and Euler angles.
    pub fn from_translation_euler(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        let translation = Vector3::new(x, y, z);
        let rotation = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        Self::new(translation, rotation)
    }

    /// Create SE3 from SO3 and Vector3 components.
    pub fn from_translation_so3(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            rotation,
            translation,
        }
    }

    /// Create SE3 from a 4x4 homogeneous matrix.
    ///
    /// The top-left 3x3 block must be a proper rotation and the bottom row must be
    /// [0, 0, 0, 1], both within [`RIGID_TOLERANCE`].
    pub fn from_matrix(matrix: &Matrix4<f64>) -> ManifoldResult<Self> {
        let bottom_row = matrix.fixed_view::<1, 4>(3, 0);
        let expected_row = nalgebra::RowVector4::new(0.0, 0.0, 0.0, 1.0);
        if (bottom_row - expected_row).norm() > RIGID_TOLERANCE {
            return Err(ManifoldError::InvalidElement(format!(
                "homogeneous bottom row is {bottom_row}, expected [0, 0, 0, 1]"
            )));
        }

        let rotation_block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let rotation = SO3::from_rotation_matrix(&rotation_block, RIGID_TOLERANCE)?;
        let translation = matrix.fixed_view::<3, 1>(0, 3).into_owned();

        Ok(SE3::from_translation_so3(translation, rotation))
    }

    /// Get the translation part as a Vector3.
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    /// Get the rotation part as a UnitQuaternion.
    pub fn rotation_quaternion(&self) -> UnitQuaternion<f64> {
        self.rotation.quaternion()
    }

    /// Get the rotation part as a 3x3 matrix.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation.rotation_matrix()
    }

    /// Get as an Isometry3 (convenience method).
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.translation),
            self.rotation_quaternion(),
        )
    }

    /// Get the transformation matrix (4x4 homogeneous matrix).
    pub fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }
}

impl LieGroup for SE3 {
    type Element = SE3;
    type JacobianMatrix = Matrix6<f64>;

    const DIM: usize = 3;
    const DOF: usize = 6;
    const REP_SIZE: usize = 7;

    fn identity() -> Self::Element {
        SE3 {
            rotation: SO3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Get the inverse.
    ///
    /// # Notes
    /// M⁻¹ = [ Rᵀ -Rᵀt ]
    ///       [ 0    1   ]
    ///
    /// J_M⁻¹_M = -Ad(M)
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self::Element {
        let rot_inv = self.rotation.inverse(None);
        let trans_inv = -rot_inv.act(&self.translation);

        if let Some(jac) = jacobian {
            *jac = -self.adjoint();
        }

        SE3::from_translation_so3(trans_inv, rot_inv)
    }

    /// Composition of this and another SE3 element.
    ///
    /// # Notes
    /// M_a M_b = [ R_a*R_b   R_a*t_b + t_a ]
    ///           [ 0             1         ]
    ///
    /// J_MaMb_Ma = Ad(M_b⁻¹)
    /// J_MaMb_Mb = I_6
    fn compose(
        &self,
        other: &Self::Element,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self::Element {
        let composed_rotation = self.rotation.compose(&other.rotation, None, None);
        let composed_translation = self.rotation.act(&other.translation) + self.translation;

        if let Some(jac_self) = jacobian_self {
            *jac_self = other.inverse(None).adjoint();
        }

        if let Some(jac_other) = jacobian_other {
            *jac_other = Matrix6::identity();
        }

        SE3::from_translation_so3(composed_translation, composed_rotation)
    }

    fn between(&self, other: &Self::Element) -> Self::Element {
        self.inverse(None).compose(other, None, None)
    }

    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(vector) + self.translation
    }

    /// Adjoint matrix for ξ = (θ, ρ).
    ///
    /// ```text
    /// Ad(M) = [ R       0 ]
    ///         [ [t]ₓR   R ]
    /// ```
    fn adjoint(&self) -> Self::JacobianMatrix {
        let rotation_matrix = self.rotation.rotation_matrix();
        let mut adjoint_matrix = Matrix6::zeros();

        adjoint_matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&rotation_matrix);
        adjoint_matrix
            .fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&rotation_matrix);
        adjoint_matrix
            .fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&(skew(&self.translation) * rotation_matrix));

        adjoint_matrix
    }

    fn random() -> Self::Element {
        use rand::Rng;
        let mut rng = rand::rng();

        // Random translation in [-1, 1]³
        let translation = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );

        SE3::from_translation_so3(translation, SO3::random())
    }

    fn normalize(&mut self) {
        self.rotation.normalize();
    }

    fn is_valid(&self, tolerance: f64) -> bool {
        self.rotation.is_valid(tolerance)
    }
}

impl SE3Tangent {
    /// Create a new SE3Tangent from theta (rotational) and rho (translational) components.
    pub fn new(theta: Vector3<f64>, rho: Vector3<f64>) -> Self {
        let mut data = Vector6::zeros();
        data.fixed_rows_mut::<3>(0).copy_from(&theta);
        data.fixed_rows_mut::<3>(3).copy_from(&rho);
        SE3Tangent { data }
    }

    /// Wrap a raw 6-vector already in (θ, ρ) order.
    pub fn from_vector(data: Vector6<f64>) -> Self {
        SE3Tangent { data }
    }

    /// Get the theta (rotational) part.
    pub fn theta(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(0).into_owned()
    }

    /// Get the rho (translational) part.
    pub fn rho(&self) -> Vector3<f64> {
        self.data.fixed_rows::<3>(3).into_owned()
    }

    /// Raw coefficients in (θ, ρ) order.
    pub fn coeffs(&self) -> Vector6<f64> {
        self.data
    }

    /// Hat operator: ξ^∧ as a 4x4 element of se(3).
    ///
    /// ```text
    /// [ [θ]ₓ  ρ ]
    /// [  0    0 ]
    /// ```
    pub fn hat(&self) -> Matrix4<f64> {
        let mut lie_alg = Matrix4::zeros();
        lie_alg
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&skew(&self.theta()));
        lie_alg.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.rho());
        lie_alg
    }

    /// Vee operator: inverse of [`SE3Tangent::hat`].
    ///
    /// Only the skew-symmetric part of the rotational block is read.
    pub fn vee(lie_alg: &Matrix4<f64>) -> Self {
        let theta = Vector3::new(
            0.5 * (lie_alg[(2, 1)] - lie_alg[(1, 2)]),
            0.5 * (lie_alg[(0, 2)] - lie_alg[(2, 0)]),
            0.5 * (lie_alg[(1, 0)] - lie_alg[(0, 1)]),
        );
        let rho = lie_alg.fixed_view::<3, 1>(0, 3).into_owned();
        SE3Tangent::new(theta, rho)
    }
}
