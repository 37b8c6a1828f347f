//! Wald F tests of linear restrictions `Rβ = r`.

use crate::core::RegressionError;
use crate::utils::invert_symmetric;
use crate::utils::matrix::{mat_vec, sandwich};
use crate::utils::matrix_rank;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Null hypothesis over a set of named coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HypothesisKind {
    /// All listed coefficients are zero.
    #[default]
    JointlyZero,
    /// All listed coefficients are equal to each other.
    AllEqual,
}

/// Outcome of an F test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Rank of `R`.
    pub df_numerator: usize,
    pub df_denominator: usize,
}

/// Restriction matrix for `q` coefficients.
///
/// `JointlyZero` gives the `q × q` identity. `AllEqual` gives the
/// `(q-1) × q` matrix of adjacent differences, so row `i` encodes
/// `β_i - β_{i+1} = 0`.
pub fn contrast_matrix(q: usize, kind: HypothesisKind) -> Result<Mat<f64>, RegressionError> {
    match kind {
        HypothesisKind::JointlyZero => {
            if q == 0 {
                return Err(RegressionError::InvalidHypothesis(
                    "no coefficients to test".into(),
                ));
            }
            Ok(Mat::from_fn(q, q, |i, j| if i == j { 1.0 } else { 0.0 }))
        }
        HypothesisKind::AllEqual => {
            if q < 2 {
                return Err(RegressionError::InvalidHypothesis(
                    "an equality test needs at least two coefficients".into(),
                ));
            }
            Ok(Mat::from_fn(q - 1, q, |i, j| {
                if j == i {
                    1.0
                } else if j == i + 1 {
                    -1.0
                } else {
                    0.0
                }
            }))
        }
    }
}

/// Wald F test of `Rβ = r`.
///
/// `F = (Rβ - r)' (R V R')^-1 (Rβ - r) / rank(R)` with p-value from
/// `F(rank(R), df_denominator)`.
///
/// # Errors
/// `DimensionMismatch` for inconsistent shapes, `InvalidHypothesis` for an
/// empty or zero restriction matrix, `SingularMatrix` if `R V R'` is singular.
pub fn f_test(
    vcov: &Mat<f64>,
    restrictions: &Mat<f64>,
    beta: &Col<f64>,
    r: &Col<f64>,
    df_denominator: usize,
) -> Result<FTest, RegressionError> {
    let k = beta.nrows();
    if vcov.nrows() != k || vcov.ncols() != k {
        return Err(RegressionError::DimensionMismatch {
            expected: k,
            got: vcov.nrows(),
        });
    }
    if restrictions.ncols() != k {
        return Err(RegressionError::DimensionMismatch {
            expected: k,
            got: restrictions.ncols(),
        });
    }
    if r.nrows() != restrictions.nrows() {
        return Err(RegressionError::DimensionMismatch {
            expected: restrictions.nrows(),
            got: r.nrows(),
        });
    }

    let rank = matrix_rank(restrictions)?;
    if rank == 0 {
        return Err(RegressionError::InvalidHypothesis(
            "restriction matrix has rank zero".into(),
        ));
    }

    let rb = mat_vec(restrictions, beta);
    let q = restrictions.nrows();
    let diff = Col::from_fn(q, |i| rb[i] - r[i]);
    let middle = invert_symmetric(&sandwich(restrictions, vcov), "R V R'")?;
    let weighted = mat_vec(&middle, &diff);
    let quad: f64 = (0..q).map(|i| diff[i] * weighted[i]).sum();

    let statistic = quad / rank as f64;
    let p_value = FisherSnedecor::new(rank as f64, df_denominator as f64)
        .map_or(f64::NAN, |d| 1.0 - d.cdf(statistic));

    Ok(FTest {
        statistic,
        p_value,
        df_numerator: rank,
        df_denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contrast_matrices() {
        let eye = contrast_matrix(3, HypothesisKind::JointlyZero).unwrap();
        assert_eq!(eye.nrows(), 3);
        assert_eq!(eye[(1, 1)], 1.0);

        let diff = contrast_matrix(3, HypothesisKind::AllEqual).unwrap();
        assert_eq!((diff.nrows(), diff.ncols()), (2, 3));
        assert_eq!(diff[(0, 0)], 1.0);
        assert_eq!(diff[(0, 1)], -1.0);
        assert_eq!(diff[(1, 1)], 1.0);
        assert_eq!(diff[(1, 2)], -1.0);
        assert_eq!(diff[(1, 0)], 0.0);

        assert!(contrast_matrix(1, HypothesisKind::AllEqual).is_err());
        assert!(contrast_matrix(0, HypothesisKind::JointlyZero).is_err());
    }

    #[test]
    fn test_single_restriction_is_t_squared() {
        let vcov = Mat::from_fn(2, 2, |i, j| if i == j { 0.25 } else { 0.05 });
        let beta = Col::from_fn(2, |i| [1.5, -0.2][i]);
        let restrictions = Mat::from_fn(1, 2, |_, j| if j == 0 { 1.0 } else { 0.0 });
        let r = Col::zeros(1);
        let test = f_test(&vcov, &restrictions, &beta, &r, 30).unwrap();

        let t = 1.5 / 0.5;
        assert_relative_eq!(test.statistic, t * t, epsilon = 1e-12);
        assert_eq!(test.df_numerator, 1);
        assert_eq!(test.df_denominator, 30);
        assert!(test.p_value > 0.0 && test.p_value < 0.01);
    }

    #[test]
    fn test_identity_covariance_joint_test() {
        let vcov = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let beta = Col::from_fn(2, |i| [3.0, 4.0][i]);
        let restrictions = contrast_matrix(2, HypothesisKind::JointlyZero).unwrap();
        let test = f_test(&vcov, &restrictions, &beta, &Col::zeros(2), 100).unwrap();
        // (9 + 16) / 2
        assert_relative_eq!(test.statistic, 12.5, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_errors() {
        let vcov = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });
        let beta = Col::zeros(2);
        let restrictions = Mat::from_fn(1, 3, |_, _| 1.0);
        assert!(matches!(
            f_test(&vcov, &restrictions, &beta, &Col::zeros(1), 10),
            Err(RegressionError::DimensionMismatch { .. })
        ));
        let zero = Mat::zeros(1, 2);
        assert!(matches!(
            f_test(&vcov, &zero, &beta, &Col::zeros(1), 10),
            Err(RegressionError::InvalidHypothesis(_))
        ));
    }
}
