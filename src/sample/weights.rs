//! Analytic weights.

use crate::core::RegressionError;
use faer::{Col, Mat};

/// Row multipliers `sqrt(w_i / mean(w))`.
///
/// Multiplying `y` and every design column by these turns weighted least
/// squares into ordinary least squares. Rescaling to mean one keeps the
/// weighted residual sum of squares on the scale of the unweighted one.
///
/// # Errors
/// `InvalidWeights` for negative or non-finite weights, or a non-positive sum.
pub fn analytic_row_weights(weights: &[f64]) -> Result<Col<f64>, RegressionError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(RegressionError::InvalidWeights);
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(RegressionError::InvalidWeights);
    }
    let mean = total / weights.len() as f64;
    Ok(Col::from_fn(weights.len(), |i| (weights[i] / mean).sqrt()))
}

pub(crate) fn scale_rows(values: &mut Mat<f64>, row_weights: &Col<f64>) {
    for j in 0..values.ncols() {
        for i in 0..values.nrows() {
            values[(i, j)] *= row_weights[i];
        }
    }
}

pub(crate) fn scale_col(values: &mut Col<f64>, row_weights: &Col<f64>) {
    for i in 0..values.nrows() {
        values[i] *= row_weights[i];
    }
}
