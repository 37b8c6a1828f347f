//! Eigen- and singular-value helpers built on faer's decompositions.

use crate::core::RegressionError;
use crate::utils::matrix::{mat_mul, symmetrize};
use faer::{Mat, Side};

/// Eigenvalues (ascending) and eigenvectors of a symmetric matrix.
pub(crate) fn symmetric_eigen(a: &Mat<f64>) -> Result<(Vec<f64>, Mat<f64>), RegressionError> {
    let n = a.nrows();
    if n == 0 {
        return Ok((Vec::new(), Mat::zeros(0, 0)));
    }
    let eig = a.as_ref().self_adjoint_eigen(Side::Lower).map_err(|err| {
        RegressionError::NumericalError(format!("self-adjoint eigendecomposition failed: {err:?}"))
    })?;
    let s = eig.S();
    let s_col = s.column_vector();
    let values: Vec<f64> = (0..s_col.nrows()).map(|i| s_col[i]).collect();
    let vectors = eig.U();

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
    let sorted_vectors = Mat::from_fn(n, n, |r, c| vectors[(r, order[c])]);
    let sorted_values = order.iter().map(|&i| values[i]).collect();
    Ok((sorted_values, sorted_vectors))
}

/// Smallest eigenvalue of a symmetric matrix.
pub(crate) fn min_eigenvalue(a: &Mat<f64>) -> Result<f64, RegressionError> {
    let (values, _) = symmetric_eigen(a)?;
    values
        .first()
        .copied()
        .ok_or_else(|| RegressionError::NumericalError("eigenvalue of an empty matrix".into()))
}

/// `A^{-1/2}` for a symmetric positive definite matrix.
///
/// Eigenvalues at or below `max(λ) · n · ε` mark the matrix as singular.
pub(crate) fn inverse_sqrt_symmetric(
    a: &Mat<f64>,
    context: &'static str,
) -> Result<Mat<f64>, RegressionError> {
    let n = a.nrows();
    let (values, vectors) = symmetric_eigen(&symmetrize(a))?;
    let largest = values.last().copied().unwrap_or(0.0);
    let tol = largest.abs() * (n.max(1) as f64) * f64::EPSILON;
    if values.iter().any(|&v| !v.is_finite() || v <= tol) {
        return Err(RegressionError::SingularMatrix { context });
    }

    let scaled = Mat::from_fn(n, n, |i, j| vectors[(i, j)] / values[j].sqrt());
    let vt = Mat::from_fn(n, n, |i, j| vectors[(j, i)]);
    Ok(symmetrize(&mat_mul(&scaled, &vt)))
}

/// Numerical rank of a matrix from its singular values.
///
/// Singular values below `max(s) · max(m, n) · ε` count as zero.
pub fn matrix_rank(a: &Mat<f64>) -> Result<usize, RegressionError> {
    if a.nrows() == 0 || a.ncols() == 0 {
        return Ok(0);
    }
    let svd = a
        .svd()
        .map_err(|err| RegressionError::NumericalError(format!("SVD failed: {err:?}")))?;
    let s = svd.S();
    let s_col = s.column_vector();

    let mut s_max: f64 = 0.0;
    for i in 0..s_col.nrows() {
        s_max = s_max.max(s_col[i]);
    }
    let tol = s_max * (a.nrows().max(a.ncols()) as f64) * f64::EPSILON;
    Ok((0..s_col.nrows()).filter(|&i| s_col[i] > tol).count())
}
