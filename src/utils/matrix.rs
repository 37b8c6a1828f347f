//! Dense matrix helpers used by the solvers and covariance estimators.

use crate::core::RegressionError;
use faer::linalg::solvers::{Llt, PartialPivLu, Solve};
use faer::{Col, Mat, Side};

/// Pivots below this size (after unit-diagonal scaling) mark a singular matrix.
const PIVOT_TOLERANCE: f64 = 1e-13;

/// Invert a symmetric matrix.
///
/// The matrix is first scaled to unit diagonal, `D A D` with
/// `D = diag(|a_ii|^-1/2)`, so that the singularity check does not depend on
/// the units of the regressors. The scaled matrix is factored with a
/// Cholesky decomposition, or with a partial-pivoting LU when it is not
/// positive definite (a LIML bread with a fixed κ can be). A zero diagonal
/// entry (e.g. a demeaned constant) is reported as singular.
///
/// # Errors
/// `SingularMatrix` when the matrix is singular to working precision,
/// `DimensionMismatch` when it is not square.
pub fn invert_symmetric(a: &Mat<f64>, context: &'static str) -> Result<Mat<f64>, RegressionError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(RegressionError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }
    if n == 0 {
        return Ok(Mat::zeros(0, 0));
    }

    let mut scale = vec![0.0; n];
    for (i, s) in scale.iter_mut().enumerate() {
        let diag = a[(i, i)].abs();
        if !diag.is_finite() || diag == 0.0 {
            return Err(RegressionError::SingularMatrix { context });
        }
        *s = 1.0 / diag.sqrt();
    }
    let scaled = Mat::from_fn(n, n, |i, j| a[(i, j)] * scale[i] * scale[j]);
    let identity = Mat::<f64>::identity(n, n);

    let inv = match Llt::new(scaled.as_ref(), Side::Lower) {
        Ok(llt) => {
            let l = llt.L();
            if (0..n).any(|i| l[(i, i)] * l[(i, i)] <= PIVOT_TOLERANCE) {
                return Err(RegressionError::SingularMatrix { context });
            }
            llt.solve(identity.as_ref())
        }
        Err(_) => {
            let lu = PartialPivLu::new(scaled.as_ref());
            let u = lu.U();
            if (0..n).any(|i| !u[(i, i)].is_finite() || u[(i, i)].abs() <= PIVOT_TOLERANCE) {
                return Err(RegressionError::SingularMatrix { context });
            }
            lu.solve(identity.as_ref())
        }
    };

    if (0..n).any(|i| (0..n).any(|j| !inv[(i, j)].is_finite())) {
        return Err(RegressionError::SingularMatrix { context });
    }

    // A^-1 = D (D A D)^-1 D
    Ok(Mat::from_fn(n, n, |i, j| inv[(i, j)] * scale[i] * scale[j]))
}

/// `X'X`.
pub(crate) fn gram(x: &Mat<f64>) -> Mat<f64> {
    cross(x, x)
}

/// `A'B` for matrices with the same number of rows.
pub(crate) fn cross(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let n = a.nrows();
    let mut result = Mat::zeros(a.ncols(), b.ncols());
    for r in 0..a.ncols() {
        for c in 0..b.ncols() {
            let mut sum = 0.0;
            for i in 0..n {
                sum += a[(i, r)] * b[(i, c)];
            }
            result[(r, c)] = sum;
        }
    }
    result
}

/// `A'y`.
pub(crate) fn cross_vec(a: &Mat<f64>, y: &Col<f64>) -> Col<f64> {
    let n = a.nrows();
    Col::from_fn(a.ncols(), |j| {
        let mut sum = 0.0;
        for i in 0..n {
            sum += a[(i, j)] * y[i];
        }
        sum
    })
}

/// Simple matrix multiplication (A × B).
pub(crate) fn mat_mul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let m = a.nrows();
    let n = b.ncols();
    let k = a.ncols();
    let mut result = Mat::zeros(m, n);
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for l in 0..k {
                sum += a[(i, l)] * b[(l, j)];
            }
            result[(i, j)] = sum;
        }
    }
    result
}

/// `A v`.
pub(crate) fn mat_vec(a: &Mat<f64>, v: &Col<f64>) -> Col<f64> {
    let k = a.ncols();
    Col::from_fn(a.nrows(), |i| {
        let mut sum = 0.0;
        for j in 0..k {
            sum += a[(i, j)] * v[j];
        }
        sum
    })
}

/// `L M L'`.
pub(crate) fn sandwich(left: &Mat<f64>, middle: &Mat<f64>) -> Mat<f64> {
    let lm = mat_mul(left, middle);
    let p = left.nrows();
    let k = left.ncols();
    let mut result = Mat::zeros(p, p);
    for i in 0..p {
        for j in 0..p {
            let mut sum = 0.0;
            for l in 0..k {
                sum += lm[(i, l)] * left[(j, l)];
            }
            result[(i, j)] = sum;
        }
    }
    result
}

/// `(A + A') / 2`.
pub(crate) fn symmetrize(a: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| 0.5 * (a[(i, j)] + a[(j, i)]))
}

/// `A - B`.
pub(crate) fn subtract(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)] - b[(i, j)])
}

/// `s A`.
pub(crate) fn scale(a: &Mat<f64>, s: f64) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| s * a[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invert_known_matrix() {
        // [[4, 2], [2, 3]]^-1 = [[3, -2], [-2, 4]] / 8
        let a = Mat::from_fn(2, 2, |i, j| [[4.0, 2.0], [2.0, 3.0]][i][j]);
        let inv = invert_symmetric(&a, "test").unwrap();
        assert_relative_eq!(inv[(0, 0)], 3.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(inv[(0, 1)], -2.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(inv[(1, 1)], 4.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_badly_scaled_matrix() {
        // Columns on very different scales should still invert.
        let x = Mat::from_fn(50, 2, |i, j| if j == 0 { 1.0 } else { 1e6 * (i as f64) });
        let xtx = gram(&x);
        let inv = invert_symmetric(&xtx, "X'X").unwrap();
        let identity = mat_mul(&xtx, &inv);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((identity[(i, j)] - expected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_singular_matrix_detected() {
        let x = Mat::from_fn(10, 2, |i, j| (i as f64 + 1.0) * (j as f64 + 1.0));
        let result = invert_symmetric(&gram(&x), "X'X");
        assert!(matches!(
            result,
            Err(RegressionError::SingularMatrix { context: "X'X" })
        ));

        let zero_col = Mat::from_fn(5, 2, |i, j| if j == 0 { i as f64 } else { 0.0 });
        assert!(invert_symmetric(&gram(&zero_col), "X'X").is_err());
    }

    #[test]
    fn test_invert_indefinite_matrix() {
        // [[1, 2], [2, 1]]^-1 = [[-1, 2], [2, -1]] / 3
        let a = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 2.0 });
        let inv = invert_symmetric(&a, "test").unwrap();
        assert_relative_eq!(inv[(0, 0)], -1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(inv[(0, 1)], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(inv[(1, 1)], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_matrix_inverts_to_empty() {
        let inv = invert_symmetric(&Mat::zeros(0, 0), "empty").unwrap();
        assert_eq!(inv.nrows(), 0);
    }

    #[test]
    fn test_sandwich_and_symmetrize() {
        let left = Mat::from_fn(2, 3, |i, j| (i + j) as f64);
        let middle = Mat::from_fn(3, 3, |i, j| if i == j { 2.0 } else { 0.0 });
        let result = sandwich(&left, &middle);
        // L (2I) L'
        let expected = scale(&mat_mul(&left, &Mat::from_fn(3, 2, |i, j| left[(j, i)])), 2.0);
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(result[(i, j)], expected[(i, j)]);
            }
        }

        let asym = Mat::from_fn(2, 2, |i, j| (2 * i + j) as f64);
        let sym = symmetrize(&asym);
        assert_eq!(sym[(0, 1)], sym[(1, 0)]);
        assert_eq!(sym[(0, 1)], 1.5);
    }

    #[test]
    fn test_cross_products() {
        let a = Mat::from_fn(3, 2, |i, j| (i * 2 + j) as f64);
        let y = Col::from_fn(3, |i| i as f64);
        let aty = cross_vec(&a, &y);
        // column 0 = [0, 2, 4], column 1 = [1, 3, 5]
        assert_eq!(aty[0], 10.0);
        assert_eq!(aty[1], 13.0);
        let v = mat_vec(&a, &Col::from_fn(2, |_| 1.0));
        assert_eq!(v[2], 9.0);
    }
}
