//! Rigid-transform primitives consumed by the uncertainty compounding engine.
//!
//! This module provides the minimal Lie group machinery needed to compound
//! uncertain poses:
//! - **SO(3)**: rotations in 3D
//! - **SE(3)**: rigid body transformations in 3D
//!
//! Lie group M,° | size   | dim | X ∈ M                   | Constraint      | T_X M                 | Comp. | Action
//! ------------- | ------ | --- | ----------------------- | --------------- | --------------------- | ----- | ------
//! Rotation      | SO(3),.| 3   | R                       | RᵀR = I         | [θ] ∈ R³              | R₁R₂  | Rx
//! Rigid motion  | SE(3),.| 6   | M = [R t; 0 1]          | RᵀR = I         | [θ, ρ] ∈ R⁶           | M₁M₂  | Rx+t
//!
//! # Tangent convention
//!
//! SE(3) tangent vectors are ordered as ξ = (θ, ρ): orientation first, position
//! second. The adjoint matrix and every covariance in this crate use that ordering.
//!
//! The exponential and logarithmic maps are not provided: compounding only
//! needs composition, the adjoint and the skew operator.
//!
//! # Example
//!
//! ```rust
//! use apex_uncertainty::manifold::{LieGroup, se3::SE3};
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let a = SE3::new(Vector3::new(1.0, 0.0, 0.0), UnitQuaternion::identity());
//! let b = SE3::new(Vector3::new(0.0, 1.0, 0.0), UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3));
//! let ab = a.compose(&b, None, None);
//! assert!(ab.is_valid(1e-9));
//! ```

use nalgebra::{Matrix3, Vector3};
use std::fmt::Debug;
use thiserror::Error;

pub mod se3;
pub mod so3;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Invalid manifold element
    #[error("Invalid manifold element: {0}")]
    InvalidElement(String),
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Skew-symmetric generator ("hat") of a 3-vector.
///
/// Returns [v]× such that [v]× u = v × u:
///
/// ```text
/// [v]× = |  0   -v_z   v_y |
///        |  v_z   0   -v_x |
///        | -v_y  v_x    0  |
/// ```
#[inline]
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Core trait for the Lie group operations used by compounding.
///
/// # Type Parameters
///
/// - `Element`: The Lie group element type
/// - `JacobianMatrix`: The Jacobian matrix type, also the adjoint matrix type
///
/// # Dimensions
///
/// - `DIM`: Space dimension - dimension of ambient space (e.g., 3 for SE(3))
/// - `DOF`: Degrees of freedom - tangent space dimension (e.g., 6 for SE(3))
/// - `REP_SIZE`: Representation size - underlying data size (e.g., 7 for SE(3))
pub trait LieGroup: Clone + Debug + PartialEq {
    /// The Lie group element type
    type Element: Clone + Debug + PartialEq;

    /// The Jacobian matrix type
    type JacobianMatrix: Clone + Debug + PartialEq;

    /// Space dimension - dimension of the ambient space that the group acts on
    const DIM: usize;

    /// Degrees of freedom - dimension of the tangent space
    const DOF: usize;

    /// Representation size - size of the underlying data representation
    const REP_SIZE: usize;

    /// Get the identity element of the group.
    fn identity() -> Self::Element;

    /// Compute the inverse of this element.
    ///
    /// # Arguments
    /// * `jacobian` - Optional mutable reference to store the Jacobian ∂(g⁻¹)/∂g
    fn inverse(&self, jacobian: Option<&mut Self::JacobianMatrix>) -> Self::Element;

    /// Compose this element with another (group multiplication g₁ ∘ g₂).
    ///
    /// # Arguments
    /// * `other` - The right operand for composition
    /// * `jacobian_self` - Optional Jacobian ∂(g₁ ∘ g₂)/∂g₁
    /// * `jacobian_other` - Optional Jacobian ∂(g₁ ∘ g₂)/∂g₂
    fn compose(
        &self,
        other: &Self::Element,
        jacobian_self: Option<&mut Self::JacobianMatrix>,
        jacobian_other: Option<&mut Self::JacobianMatrix>,
    ) -> Self::Element;

    /// Compute g₁⁻¹ ∘ g₂ (relative transformation).
    fn between(&self, other: &Self::Element) -> Self::Element;

    /// Act on a vector v: g ⊙ v.
    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64>;

    /// Adjoint matrix Ad(g).
    ///
    /// Maps tangent vectors expressed at g to tangent vectors at the identity:
    /// Ad(g) φ = (g ∘ φ^∧ ∘ g⁻¹)^∨.
    fn adjoint(&self) -> Self::JacobianMatrix;

    /// Generate a random element (useful for testing).
    fn random() -> Self::Element;

    /// Project the element back onto the manifold.
    fn normalize(&mut self);

    /// Check if the element is approximately on the manifold.
    fn is_valid(&self, tolerance: f64) -> bool;
}
