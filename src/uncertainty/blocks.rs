//! 3x3 corner access for (θ, ρ)-ordered 6x6 covariances.
//!
//! ```text
//! Σ = [ Σ_θθ  Σ_θρ ]
//!     [ Σ_ρθ  Σ_ρρ ]
//! ```

use nalgebra::{Matrix3, Matrix6};

/// One of the four 3x3 blocks of a (θ, ρ)-ordered 6x6 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Top-left, orientation/orientation
    ThetaTheta,
    /// Top-right, orientation/position
    ThetaRho,
    /// Bottom-left, position/orientation
    RhoTheta,
    /// Bottom-right, position/position
    RhoRho,
}

impl Corner {
    /// Row and column offset of the block inside the 6x6 matrix.
    pub const fn offset(self) -> (usize, usize) {
        match self {
            Corner::ThetaTheta => (0, 0),
            Corner::ThetaRho => (0, 3),
            Corner::RhoTheta => (3, 0),
            Corner::RhoRho => (3, 3),
        }
    }
}

/// Copy one 3x3 block out of a 6x6 matrix.
#[inline]
pub fn corner(matrix: &Matrix6<f64>, which: Corner) -> Matrix3<f64> {
    let (row, col) = which.offset();
    matrix.fixed_view::<3, 3>(row, col).into_owned()
}

/// Overwrite one 3x3 block of a 6x6 matrix.
#[inline]
pub fn set_corner(matrix: &mut Matrix6<f64>, which: Corner, block: &Matrix3<f64>) {
    let (row, col) = which.offset();
    matrix.fixed_view_mut::<3, 3>(row, col).copy_from(block);
}

/// The four blocks of a 6x6 matrix, split once per compounding call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovarianceBlocks {
    pub theta_theta: Matrix3<f64>,
    pub theta_rho: Matrix3<f64>,
    pub rho_theta: Matrix3<f64>,
    pub rho_rho: Matrix3<f64>,
}

impl CovarianceBlocks {
    pub fn split(matrix: &Matrix6<f64>) -> Self {
        CovarianceBlocks {
            theta_theta: corner(matrix, Corner::ThetaTheta),
            theta_rho: corner(matrix, Corner::ThetaRho),
            rho_theta: corner(matrix, Corner::RhoTheta),
            rho_rho: corner(matrix, Corner::RhoRho),
        }
    }

    /// Reassemble the 6x6 matrix from its blocks.
    pub fn assemble(&self) -> Matrix6<f64> {
        let mut matrix = Matrix6::zeros();
        set_corner(&mut matrix, Corner::ThetaTheta, &self.theta_theta);
        set_corner(&mut matrix, Corner::ThetaRho, &self.theta_rho);
        set_corner(&mut matrix, Corner::RhoTheta, &self.rho_theta);
        set_corner(&mut matrix, Corner::RhoRho, &self.rho_rho);
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_matrix() -> Matrix6<f64> {
        Matrix6::from_fn(|r, c| (10 * r + c) as f64)
    }

    #[test]
    fn test_corner_offsets() {
        let m = indexed_matrix();
        assert_eq!(corner(&m, Corner::ThetaTheta)[(0, 0)], 0.0);
        assert_eq!(corner(&m, Corner::ThetaRho)[(0, 0)], 3.0);
        assert_eq!(corner(&m, Corner::RhoTheta)[(0, 0)], 30.0);
        assert_eq!(corner(&m, Corner::RhoRho)[(2, 2)], 55.0);
    }

    #[test]
    fn test_set_corner_only_touches_block() {
        let mut m = Matrix6::zeros();
        set_corner(&mut m, Corner::RhoTheta, &Matrix3::repeat(1.0));

        assert_eq!(m.sum(), 9.0);
        assert_eq!(corner(&m, Corner::RhoTheta), Matrix3::repeat(1.0));
        assert_eq!(corner(&m, Corner::ThetaRho), Matrix3::zeros());
    }

    #[test]
    fn test_split_assemble() {
        let m = indexed_matrix();
        let blocks = CovarianceBlocks::split(&m);
        assert_eq!(blocks.assemble(), m);
        assert_eq!(blocks.rho_theta, corner(&m, Corner::RhoTheta));
    }
}
