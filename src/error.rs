//! Error types for the apex-uncertainty library
//!
//! Compounding itself never fails; errors only come from validated construction
//! and from the optional covariance sanity checks. All errors use the
//! `thiserror` crate for automatic trait implementations.

use crate::{manifold::ManifoldError, uncertainty::UncertaintyError};
use thiserror::Error;

/// Main result type used throughout the apex-uncertainty library
pub type ApexResult<T> = Result<T, ApexError>;

/// Main error type for the apex-uncertainty library
#[derive(Debug, Clone, Error)]
pub enum ApexError {
    /// Manifold operations errors
    #[error("Manifold error: {0}")]
    Manifold(String),

    /// Covariance sanity check failures
    #[error("Uncertainty error: {0}")]
    Uncertainty(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ManifoldError> for ApexError {
    fn from(err: ManifoldError) -> Self {
        ApexError::Manifold(err.to_string())
    }
}

impl From<UncertaintyError> for ApexError {
    fn from(err: UncertaintyError) -> Self {
        ApexError::Uncertainty(err.to_string())
    }
}
