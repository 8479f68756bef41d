//! Uncertainty compounding for SE(3) poses.
//!
//! An [`SE3Cov`] pairs a rigid transform with a 6x6 covariance over its tangent
//! space in (θ, ρ) ordering. Compounding with an increment returns a new value
//! and never mutates either operand:
//!
//! - [`SE3Cov::compound_2nd_order`]: linear adjoint transport
//! - [`SE3Cov::compound_4th_order`]: adjoint transport plus bracket corrections
//!
//! Inputs are trusted: a non-symmetric or indefinite covariance produces a
//! numerically meaningless (but well-typed) result. Long chains of
//! ill-conditioned covariances may lose positive semi-definiteness; nothing is
//! clamped. Callers that want a sanity check can use
//! [`SE3Cov::check_covariance`].
//!
//! # Example
//!
//! ```rust
//! use apex_uncertainty::manifold::se3::SE3;
//! use apex_uncertainty::uncertainty::SE3Cov;
//! use nalgebra::{Matrix6, Vector6};
//!
//! let start = SE3Cov::new(SE3::default(), Matrix6::zeros());
//! let step = SE3::from_translation_euler(1.0, 0.0, 0.0, 0.0, 0.0, 0.1);
//! let noise = Matrix6::from_diagonal(&Vector6::new(1e-4, 1e-4, 1e-4, 1e-2, 1e-2, 1e-2));
//!
//! let second = start.compound_2nd_order(&step, &noise);
//! let fourth = start.compound_4th_order(&step, &noise);
//! assert_eq!(second.pose(), fourth.pose());
//! ```

use thiserror::Error;

pub mod blocks;
pub mod brackets;
pub mod compound;
pub mod se3_cov;

pub use compound::CompoundingOrder;
pub use se3_cov::{SE3Cov, curly_wedge};

/// Errors reported by the covariance sanity checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UncertaintyError {
    /// ‖Σ - Σᵀ‖ exceeds the tolerance
    #[error("Covariance is not symmetric: |Σ - Σᵀ| = {asymmetry:.3e}")]
    NotSymmetric { asymmetry: f64 },

    /// Smallest eigenvalue is below -tolerance
    #[error("Covariance is not positive semi-definite: min eigenvalue = {min_eigenvalue:.3e}")]
    NotPositiveSemiDefinite { min_eigenvalue: f64 },
}

/// Result type for uncertainty checks.
pub type UncertaintyResult<T> = Result<T, UncertaintyError>;
