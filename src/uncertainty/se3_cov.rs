//! SE(3) pose with attached Gaussian uncertainty.

use crate::manifold::se3::SE3;
use crate::manifold::{LieGroup, ManifoldResult, skew};
use crate::uncertainty::blocks::{Corner, set_corner};
use crate::uncertainty::compound::{
    CompoundingOrder, compound_covariance_2nd_order, compound_covariance_4th_order,
};
use crate::uncertainty::{UncertaintyError, UncertaintyResult};
use nalgebra::{Matrix4, Matrix6, SymmetricEigen, Vector3, Vector6};
use std::fmt;
use std::ops::Mul;
use tracing::info;

/// A pose in SE(3) together with its 6x6 tangent-space covariance.
///
/// The covariance uses the convention ξ = (θ, ρ), θ being the orientation and ρ
/// the position part:
///
/// ```text
/// Σ = E[ξ·ξᵀ] = [ Σ_θθ  Σ_θρ ]
///               [ Σ_ρθ  Σ_ρρ ]
/// ```
///
/// The value is immutable: every compounding method returns a new `SE3Cov`.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3Cov {
    pose: SE3,
    covariance: Matrix6<f64>,
}

impl Default for SE3Cov {
    /// Identity pose with identity covariance.
    fn default() -> Self {
        SE3Cov {
            pose: SE3::identity(),
            covariance: Matrix6::identity(),
        }
    }
}

impl SE3Cov {
    pub fn new(pose: SE3, covariance: Matrix6<f64>) -> Self {
        SE3Cov { pose, covariance }
    }

    /// Build from a 4x4 homogeneous matrix, rejecting matrices that are not rigid
    /// transforms. The covariance is taken as given.
    pub fn from_matrix(matrix: &Matrix4<f64>, covariance: Matrix6<f64>) -> ManifoldResult<Self> {
        Ok(SE3Cov::new(SE3::from_matrix(matrix)?, covariance))
    }

    pub fn pose(&self) -> &SE3 {
        &self.pose
    }

    pub fn covariance(&self) -> &Matrix6<f64> {
        &self.covariance
    }

    /// Second-order compounding with a pose increment and its covariance.
    ///
    /// The increment uncertainty is assumed independent of the current one:
    ///
    /// ```text
    /// T' = T₁·T₂
    /// Σ' = Σ₁ + Ad(T₁) Σ₂ Ad(T₁)ᵀ
    /// ```
    pub fn compound_2nd_order(
        &self,
        pose_increment: &SE3,
        increment_covariance: &Matrix6<f64>,
    ) -> SE3Cov {
        let adj = self.pose.adjoint();
        SE3Cov::new(
            self.pose.compose(pose_increment, None, None),
            compound_covariance_2nd_order(&self.covariance, &adj, increment_covariance),
        )
    }

    /// Second-order compounding with an uncertain increment.
    pub fn compound_2nd_order_with(&self, increment: &SE3Cov) -> SE3Cov {
        self.compound_2nd_order(&increment.pose, &increment.covariance)
    }

    /// Fourth-order compounding with a pose increment and its covariance.
    ///
    /// The resulting pose is identical to [`SE3Cov::compound_2nd_order`]; only the
    /// covariance gains the bracket correction terms.
    pub fn compound_4th_order(
        &self,
        pose_increment: &SE3,
        increment_covariance: &Matrix6<f64>,
    ) -> SE3Cov {
        let adj = self.pose.adjoint();
        SE3Cov::new(
            self.pose.compose(pose_increment, None, None),
            compound_covariance_4th_order(&self.covariance, &adj, increment_covariance),
        )
    }

    /// Fourth-order compounding with an uncertain increment.
    pub fn compound_4th_order_with(&self, increment: &SE3Cov) -> SE3Cov {
        self.compound_4th_order(&increment.pose, &increment.covariance)
    }

    /// Compound with the formula selected by `order`.
    pub fn compound(
        &self,
        pose_increment: &SE3,
        increment_covariance: &Matrix6<f64>,
        order: CompoundingOrder,
    ) -> SE3Cov {
        match order {
            CompoundingOrder::Second => {
                self.compound_2nd_order(pose_increment, increment_covariance)
            }
            CompoundingOrder::Fourth => {
                self.compound_4th_order(pose_increment, increment_covariance)
            }
        }
    }

    /// Compound a sequence of uncertain increments, left to right.
    ///
    /// An empty sequence returns a copy of `self`.
    pub fn compound_chain<'a, I>(&self, increments: I, order: CompoundingOrder) -> SE3Cov
    where
        I: IntoIterator<Item = &'a SE3Cov>,
    {
        increments
            .into_iter()
            .fold(self.clone(), |acc, increment| {
                acc.compound(&increment.pose, &increment.covariance, order)
            })
    }

    /// Same as [`SE3Cov::compound_2nd_order_with`].
    pub fn multiply(&self, rhs: &SE3Cov) -> SE3Cov {
        self.compound_2nd_order_with(rhs)
    }

    /// Caller-side sanity check of the covariance.
    ///
    /// Compounding never calls this; it is meant for estimators that want to
    /// catch degenerate chains.
    pub fn check_covariance(&self, tolerance: f64) -> UncertaintyResult<()> {
        let asymmetry = (self.covariance - self.covariance.transpose()).norm();
        if asymmetry > tolerance {
            return Err(UncertaintyError::NotSymmetric { asymmetry });
        }

        let min_eigenvalue = SymmetricEigen::new(self.covariance).eigenvalues.min();
        if min_eigenvalue < -tolerance {
            return Err(UncertaintyError::NotPositiveSemiDefinite { min_eigenvalue });
        }

        Ok(())
    }

    /// Log the pose and covariance at INFO level.
    pub fn print(&self) {
        info!("\n{}", self);
    }

    /// The pose as a 4x4 homogeneous matrix string.
    pub fn pose_to_string(&self) -> String {
        self.pose.matrix().to_string()
    }
}

impl fmt::Display for SE3Cov {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pose:")?;
        write!(f, "{}", self.pose.matrix())?;
        writeln!(f, "Covariance:")?;
        write!(f, "{}", self.covariance)
    }
}

impl Mul<&SE3Cov> for &SE3Cov {
    type Output = SE3Cov;

    fn mul(self, rhs: &SE3Cov) -> SE3Cov {
        self.compound_2nd_order_with(rhs)
    }
}

impl Mul for SE3Cov {
    type Output = SE3Cov;

    fn mul(self, rhs: SE3Cov) -> SE3Cov {
        self.compound_2nd_order_with(&rhs)
    }
}

/// Curly-wedge operator ξ^⋏ for ξ = (θ, ρ).
///
/// ```text
/// ξ^⋏ = [ [θ]ₓ   0   ]
///       [ [ρ]ₓ  [θ]ₓ ]
/// ```
///
/// This is ad(ξ), the matrix form of the Lie bracket on se(3).
pub fn curly_wedge(xi: &Vector6<f64>) -> Matrix6<f64> {
    let theta_hat = skew(&Vector3::new(xi[0], xi[1], xi[2]));
    let rho_hat = skew(&Vector3::new(xi[3], xi[4], xi[5]));

    let mut result = Matrix6::zeros();
    set_corner(&mut result, Corner::ThetaTheta, &theta_hat);
    set_corner(&mut result, Corner::RhoRho, &theta_hat);
    set_corner(&mut result, Corner::RhoTheta, &rho_hat);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::se3::SE3Tangent;
    use crate::uncertainty::blocks::corner;
    use nalgebra::Matrix3;
    use rand::Rng;

    const TOLERANCE: f64 = 1e-12;

    fn random_psd() -> Matrix6<f64> {
        let mut rng = rand::rng();
        let m = Matrix6::from_fn(|_, _| rng.random_range(-0.1..0.1));
        m * m.transpose()
    }

    fn diagonal(angular: f64, linear: f64) -> Matrix6<f64> {
        Matrix6::from_diagonal(&Vector6::new(
            angular, angular, angular, linear, linear, linear,
        ))
    }

    #[test]
    fn test_default_is_identity() {
        let value = SE3Cov::default();
        assert_eq!(*value.pose(), SE3::identity());
        assert_eq!(*value.covariance(), Matrix6::identity());
    }

    #[test]
    fn test_clone_is_independent_value() {
        let original = SE3Cov::new(SE3::random(), random_psd());
        let copy = original.clone();
        let compounded = copy.compound_2nd_order(&SE3::random(), &random_psd());

        assert_eq!(copy, original);
        assert_ne!(compounded.covariance(), original.covariance());
    }

    #[test]
    fn test_identity_absorption() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let identity = SE3::identity();
        let zero = Matrix6::zeros();

        for result in [
            start.compound_2nd_order(&identity, &zero),
            start.compound_4th_order(&identity, &zero),
        ] {
            assert!((result.pose().matrix() - start.pose().matrix()).norm() < TOLERANCE);
            assert!((result.covariance() - start.covariance()).norm() < TOLERANCE);
        }
    }

    #[test]
    fn test_pose_update_matches_composition() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let increment = SE3::random();
        let expected = start.pose().compose(&increment, None, None);
        let sigma = random_psd();

        assert_eq!(*start.compound_2nd_order(&increment, &sigma).pose(), expected);
        assert_eq!(*start.compound_4th_order(&increment, &sigma).pose(), expected);
    }

    #[test]
    fn test_2nd_order_transports_through_adjoint() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let sigma = random_psd();
        let adj = start.pose().adjoint();

        let result = start.compound_2nd_order(&SE3::random(), &sigma);
        let expected = start.covariance() + adj * sigma * adj.transpose();
        assert!((result.covariance() - expected).norm() < TOLERANCE);
    }

    #[test]
    fn test_concrete_scenario_from_identity() {
        let start = SE3Cov::new(SE3::identity(), Matrix6::zeros());
        let sigma = diagonal(0.01, 0.04);

        let second = start.compound_2nd_order(&SE3::identity(), &sigma);
        assert_eq!(*second.pose(), SE3::identity());
        assert_eq!(*second.covariance(), sigma);

        let fourth = start.compound_4th_order(&SE3::identity(), &sigma);
        assert_eq!(*fourth.pose(), SE3::identity());
        assert!((fourth.covariance() - sigma).norm() < TOLERANCE);
    }

    #[test]
    fn test_4th_order_regression_value() {
        let sigma = diagonal(0.01, 0.04);
        let start = SE3Cov::new(SE3::identity(), sigma);
        let result = start.compound_4th_order(&SE3::identity(), &sigma);

        let expected = diagonal(0.02 - 0.0001 / 6.0, 0.08 + 0.0004 / 3.0);
        assert!((result.covariance() - expected).norm() < TOLERANCE);
        assert!((result.covariance()[(0, 0)] - 0.019_983_333_333).abs() < 1e-11);
        assert!((result.covariance()[(5, 5)] - 0.080_133_333_333).abs() < 1e-11);
    }

    #[test]
    fn test_symmetry_preserved() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let increment = SE3::random();
        let sigma = random_psd();

        let second = start.compound_2nd_order(&increment, &sigma);
        let fourth = start.compound_4th_order(&increment, &sigma);

        assert!((second.covariance() - second.covariance().transpose()).norm() < 1e-12);
        assert!((fourth.covariance() - fourth.covariance().transpose()).norm() < 1e-12);
    }

    #[test]
    fn test_uncertain_increment_overloads() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let increment = SE3Cov::new(SE3::random(), random_psd());

        assert_eq!(
            start.compound_2nd_order_with(&increment),
            start.compound_2nd_order(increment.pose(), increment.covariance())
        );
        assert_eq!(
            start.compound_4th_order_with(&increment),
            start.compound_4th_order(increment.pose(), increment.covariance())
        );
    }

    #[test]
    fn test_multiplication_is_2nd_order() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let increment = SE3Cov::new(SE3::random(), random_psd());
        let expected = start.compound_2nd_order_with(&increment);

        assert_eq!(start.multiply(&increment), expected);
        assert_eq!(&start * &increment, expected);
        assert_eq!(start.clone() * increment.clone(), expected);
    }

    #[test]
    fn test_compound_dispatch() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let increment = SE3::random();
        let sigma = random_psd();

        assert_eq!(
            start.compound(&increment, &sigma, CompoundingOrder::Second),
            start.compound_2nd_order(&increment, &sigma)
        );
        assert_eq!(
            start.compound(&increment, &sigma, CompoundingOrder::Fourth),
            start.compound_4th_order(&increment, &sigma)
        );
    }

    #[test]
    fn test_compound_chain() {
        let start = SE3Cov::new(SE3::random(), random_psd());
        let steps: Vec<SE3Cov> = (0..4)
            .map(|_| SE3Cov::new(SE3::random(), random_psd()))
            .collect();

        let chained = start.compound_chain(&steps, CompoundingOrder::Fourth);
        let mut expected = start.clone();
        for step in &steps {
            expected = expected.compound_4th_order_with(step);
        }
        assert_eq!(chained, expected);

        let empty: Vec<SE3Cov> = Vec::new();
        assert_eq!(start.compound_chain(&empty, CompoundingOrder::Second), start);
    }

    #[test]
    fn test_from_matrix() {
        let pose = SE3::from_translation_euler(0.5, -1.0, 2.0, 0.1, 0.2, 0.3);
        let sigma = random_psd();

        let value = SE3Cov::from_matrix(&pose.matrix(), sigma);
        assert!(value.is_ok());
        if let Ok(value) = value {
            assert!((value.pose().matrix() - pose.matrix()).norm() < 1e-9);
            assert_eq!(*value.covariance(), sigma);
        }

        let mut sheared = Matrix4::identity();
        sheared[(1, 0)] = 0.3;
        assert!(SE3Cov::from_matrix(&sheared, sigma).is_err());
    }

    #[test]
    fn test_check_covariance() {
        assert!(SE3Cov::default().check_covariance(1e-9).is_ok());
        assert!(SE3Cov::new(SE3::identity(), random_psd()).check_covariance(1e-9).is_ok());

        let mut asymmetric = Matrix6::identity();
        asymmetric[(0, 5)] = 0.5;
        assert!(matches!(
            SE3Cov::new(SE3::identity(), asymmetric).check_covariance(1e-9),
            Err(UncertaintyError::NotSymmetric { .. })
        ));

        let indefinite = Matrix6::from_diagonal(&Vector6::new(1.0, 1.0, -0.5, 1.0, 1.0, 1.0));
        assert!(matches!(
            SE3Cov::new(SE3::identity(), indefinite).check_covariance(1e-9),
            Err(UncertaintyError::NotPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn test_display_and_pose_string() {
        let value = SE3Cov::new(SE3::identity(), diagonal(0.01, 0.04));
        let dump = value.to_string();

        assert!(dump.starts_with("Pose:"));
        assert!(dump.contains("Covariance:"));
        assert_eq!(value.pose_to_string(), Matrix4::<f64>::identity().to_string());
    }

    #[test]
    fn test_curly_wedge_structure() {
        let xi = Vector6::new(0.1, -0.2, 0.3, 1.0, 2.0, -3.0);
        let tangent = SE3Tangent::from_vector(xi);
        let wedge = curly_wedge(&xi);

        assert_eq!(corner(&wedge, Corner::ThetaRho), Matrix3::zeros());
        assert_eq!(corner(&wedge, Corner::ThetaTheta), skew(&tangent.theta()));
        assert_eq!(corner(&wedge, Corner::RhoRho), skew(&tangent.theta()));
        assert_eq!(corner(&wedge, Corner::RhoTheta), skew(&tangent.rho()));
    }

    #[test]
    fn test_curly_wedge_is_lie_bracket() {
        // ad(ξ₁) ξ₂ = ([ξ₁^∧, ξ₂^∧])^∨
        let xi_1 = Vector6::new(0.3, -0.1, 0.2, 0.5, -0.4, 1.2);
        let xi_2 = Vector6::new(-0.7, 0.4, 0.1, 0.2, 0.9, -0.3);
        let hat_1 = SE3Tangent::from_vector(xi_1).hat();
        let hat_2 = SE3Tangent::from_vector(xi_2).hat();

        let commutator = SE3Tangent::vee(&(hat_1 * hat_2 - hat_2 * hat_1)).coeffs();
        assert!((curly_wedge(&xi_1) * xi_2 - commutator).norm() < TOLERANCE);
    }
}
