//! Least squares via the normal equations.

use crate::core::{LabeledMatrix, LabeledVector, RegressionError};
use crate::diagnostics::{condition_number, ConditionSeverity};
use crate::utils::invert_symmetric;
use crate::utils::matrix::{cross_vec, gram, mat_vec};
use faer::{Col, Mat};

/// Coefficients and `(X'X)^-1` from a least-squares fit.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub coefficients: LabeledVector,
    pub xtx_inverse: Mat<f64>,
}

impl LeastSquaresFit {
    /// `X β` for the design the fit was computed on.
    pub fn fitted(&self, x: &LabeledMatrix) -> Col<f64> {
        mat_vec(x.values(), self.coefficients.values())
    }
}

/// Solve `β = (X'X)^-1 X'y`.
///
/// A design with no columns yields an empty coefficient vector.
///
/// # Errors
/// `DimensionMismatch` if `y` and `x` differ in rows, `SingularMatrix` if
/// the regressors are collinear.
pub fn fit_least_squares(y: &Col<f64>, x: &LabeledMatrix) -> Result<LeastSquaresFit, RegressionError> {
    if y.nrows() != x.nrows() {
        return Err(RegressionError::DimensionMismatch {
            expected: x.nrows(),
            got: y.nrows(),
        });
    }

    let xtx_inverse = invert_symmetric(&gram(x.values()), "X'X").inspect_err(|_| {
        let cond = condition_number(x.values());
        log::warn!(
            "X'X is singular; design condition number {cond:.3e} ({})",
            ConditionSeverity::classify(cond).description()
        );
    })?;
    let beta = mat_vec(&xtx_inverse, &cross_vec(x.values(), y));

    Ok(LeastSquaresFit {
        coefficients: LabeledVector::new(x.names().to_vec(), beta)?,
        xtx_inverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let x = LabeledMatrix::from_columns(4, &[("x", &[1.0, 2.0, 3.0, 4.0])])
            .unwrap()
            .with_constant();
        let y = Col::from_fn(4, |i| 3.0 + 2.0 * (i as f64 + 1.0));
        let fit = fit_least_squares(&y, &x).unwrap();
        assert_relative_eq!(fit.coefficients.get("x").unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.coefficients.get("_cons").unwrap(), 3.0, epsilon = 1e-12);

        let fitted = fit.fitted(&x);
        for i in 0..4 {
            assert_relative_eq!(fitted[i], y[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_collinear_design() {
        let x = LabeledMatrix::from_columns(
            3,
            &[("a", &[1.0, 2.0, 3.0]), ("b", &[2.0, 4.0, 6.0])],
        )
        .unwrap();
        let y = Col::from_fn(3, |i| i as f64);
        assert!(matches!(
            fit_least_squares(&y, &x),
            Err(RegressionError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_empty_design() {
        let x = LabeledMatrix::empty(3);
        let fit = fit_least_squares(&Col::zeros(3), &x).unwrap();
        assert!(fit.coefficients.is_empty());
    }
}
