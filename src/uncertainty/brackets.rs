//! Bracket operators used by the fourth-order compounding formula.
//!
//! For 3x3 matrices A and B:
//!
//! ```text
//! ⟨⟨A⟩⟩     = -tr(A)·I + A
//! ⟨⟨A, B⟩⟩  = ⟨⟨A⟩⟩⟨⟨B⟩⟩ + ⟨⟨BA⟩⟩
//! ```
//!
//! Both operate on fixed-size stack matrices only.

use nalgebra::Matrix3;

/// ⟨⟨A⟩⟩ = -tr(A)·I + A
#[inline]
pub fn bracket1(a: &Matrix3<f64>) -> Matrix3<f64> {
    a - Matrix3::identity() * a.trace()
}

/// ⟨⟨A, B⟩⟩ = ⟨⟨A⟩⟩⟨⟨B⟩⟩ + ⟨⟨BA⟩⟩
#[inline]
pub fn bracket2(a: &Matrix3<f64>, b: &Matrix3<f64>) -> Matrix3<f64> {
    bracket1(a) * bracket1(b) + bracket1(&(b * a))
}
