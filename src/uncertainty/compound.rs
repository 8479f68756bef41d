//! Covariance compounding kernels.
//!
//! Given a current pose T₁ with covariance Σ₁ and an independent increment T₂
//! with covariance Σ₂, both expressed in (θ, ρ) tangent coordinates, the
//! compounded pose is T₁·T₂ and its covariance is approximated as follows.
//!
//! # Second order
//!
//! ```text
//! Σ₂' = Ad(T₁) Σ₂ Ad(T₁)ᵀ
//! Σ   = Σ₁ + Σ₂'
//! ```
//!
//! # Fourth order
//!
//! Barfoot & Furgale, "Associating Uncertainty With Three-Dimensional Poses for
//! Use in Estimation Problems", T-RO 2014, rewritten for the (θ, ρ) ordering:
//!
//! ```text
//! Σ = Σ₁ + Σ₂' + 1/12 (A₁Σ₂' + Σ₂'A₁ᵀ + A₂Σ₁ + Σ₁A₂ᵀ) + 1/4 B
//! ```
//!
//! with A₁, A₂ built from the blocks of one operand and B from cross terms of
//! both. The correction is quadratic in the covariances, so it vanishes faster
//! than the leading sum as Σ₁, Σ₂ → 0.

use crate::uncertainty::blocks::{Corner, CovarianceBlocks, set_corner};
use crate::uncertainty::brackets::{bracket1, bracket2};
use nalgebra::{Matrix3, Matrix6};

/// Which compounding formula to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompoundingOrder {
    /// Linear adjoint transport.
    #[default]
    Second,
    /// Adjoint transport plus the bracket correction terms.
    Fourth,
}

impl std::fmt::Display for CompoundingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompoundingOrder::Second => write!(f, "2nd order"),
            CompoundingOrder::Fourth => write!(f, "4th order"),
        }
    }
}

/// Express the increment covariance in the frame of the current covariance:
/// Ad Σ Adᵀ.
#[inline]
pub fn transport_covariance(
    adjoint: &Matrix6<f64>,
    increment_covariance: &Matrix6<f64>,
) -> Matrix6<f64> {
    adjoint * increment_covariance * adjoint.transpose()
}

/// Second-order compounded covariance Σ₁ + Ad Σ₂ Adᵀ.
pub fn compound_covariance_2nd_order(
    covariance: &Matrix6<f64>,
    adjoint: &Matrix6<f64>,
    increment_covariance: &Matrix6<f64>,
) -> Matrix6<f64> {
    covariance + transport_covariance(adjoint, increment_covariance)
}

/// Fourth-order compounded covariance.
///
/// `adjoint` is Ad(T₁) of the current pose; `increment_covariance` is Σ₂ in the
/// increment's own frame.
pub fn compound_covariance_4th_order(
    covariance: &Matrix6<f64>,
    adjoint: &Matrix6<f64>,
    increment_covariance: &Matrix6<f64>,
) -> Matrix6<f64> {
    let sigma_1 = covariance;
    let sigma_2 = transport_covariance(adjoint, increment_covariance);

    let blocks_1 = CovarianceBlocks::split(sigma_1);
    let blocks_2 = CovarianceBlocks::split(&sigma_2);

    let a_1 = correction_matrix(
        &blocks_1.theta_theta,
        &(blocks_1.rho_theta + blocks_1.theta_rho),
    );
    // Barfoot's formula suggests ρθ + θρ here as for A₁. The ρθ + ρθᵀ form
    // only agrees when the transported increment is symmetric.
    // TODO: validate the A₂ off-diagonal term against the T-RO 2014 derivation.
    let a_2 = correction_matrix(
        &blocks_2.theta_theta,
        &(blocks_2.rho_theta + blocks_2.rho_theta.transpose()),
    );
    let b = cross_term_matrix(&blocks_1, &blocks_2);

    sigma_1
        + sigma_2
        + (a_1 * sigma_2
            + sigma_2 * a_1.transpose()
            + a_2 * sigma_1
            + sigma_1 * a_2.transpose())
            / 12.0
        + b / 4.0
}

/// A = [ ⟨⟨Σ_θθ⟩⟩        0       ]
///     [ ⟨⟨off_diag⟩⟩   ⟨⟨Σ_θθ⟩⟩ ]
fn correction_matrix(theta_theta: &Matrix3<f64>, off_diagonal: &Matrix3<f64>) -> Matrix6<f64> {
    let diagonal = bracket1(theta_theta);
    let mut a = Matrix6::zeros();
    set_corner(&mut a, Corner::ThetaTheta, &diagonal);
    set_corner(&mut a, Corner::RhoTheta, &bracket1(off_diagonal));
    set_corner(&mut a, Corner::RhoRho, &diagonal);
    a
}

/// B = [ B_φφ  B_ρφᵀ ]
///     [ B_ρφ  B_ρρ  ]
fn cross_term_matrix(sigma_1: &CovarianceBlocks, sigma_2: &CovarianceBlocks) -> Matrix6<f64> {
    let b_rho_rho = bracket2(&sigma_1.theta_theta, &sigma_2.rho_rho)
        + bracket2(&sigma_1.theta_rho, &sigma_2.rho_theta)
        + bracket2(&sigma_1.rho_theta, &sigma_2.theta_rho)
        + bracket2(&sigma_1.rho_rho, &sigma_2.theta_theta);

    // Uses Σ₂θρ, not the Σ₂ρθ printed in the book.
    let b_rho_phi = bracket2(&sigma_1.theta_theta, &sigma_2.theta_rho)
        + bracket2(&sigma_1.rho_theta, &sigma_2.theta_theta);

    let b_phi_phi = bracket2(&sigma_1.theta_theta, &sigma_2.theta_theta);

    CovarianceBlocks {
        theta_theta: b_phi_phi,
        theta_rho: b_rho_phi.transpose(),
        rho_theta: b_rho_phi,
        rho_rho: b_rho_rho,
    }
    .assemble()
}
