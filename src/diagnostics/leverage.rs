//! Leverage (hat values) for the small-sample HC corrections.

use crate::core::RegressionError;
use crate::utils::invert_symmetric;
use crate::utils::matrix::gram;
use faer::{Col, Mat};

/// Diagonal of the hat matrix `H = X (X'X)^-1 X'`.
///
/// # Arguments
/// * `x` - Design matrix (n × k), including any constant column
///
/// # Errors
/// `SingularMatrix` if `X'X` cannot be inverted.
pub fn compute_leverage(x: &Mat<f64>) -> Result<Col<f64>, RegressionError> {
    let xtx_inv = invert_symmetric(&gram(x), "X'X for leverage")?;
    Ok(leverage_from_inverse(x, &xtx_inv))
}

/// Hat values `h_i = x_i' (X'X)^-1 x_i` given a precomputed inverse.
pub fn leverage_from_inverse(x: &Mat<f64>, xtx_inv: &Mat<f64>) -> Col<f64> {
    let n = x.nrows();
    let k = x.ncols();
    Col::from_fn(n, |i| {
        let mut h = 0.0;
        for r in 0..k {
            let mut row = 0.0;
            for c in 0..k {
                row += xtx_inv[(r, c)] * x[(i, c)];
            }
            h += x[(i, r)] * row;
        }
        h
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_leverage_sums_to_rank() {
        let x = Mat::from_fn(6, 2, |i, j| if j == 0 { 1.0 } else { (i * i) as f64 });
        let h = compute_leverage(&x).unwrap();
        let total: f64 = h.iter().sum();
        assert_relative_eq!(total, 2.0, epsilon = 1e-10);
        for i in 0..6 {
            assert!(h[i] > 0.0 && h[i] <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_constant_only_leverage() {
        let x = Mat::from_fn(4, 1, |_, _| 1.0);
        let h = compute_leverage(&x).unwrap();
        for i in 0..4 {
            assert_relative_eq!(h[i], 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_outlying_point_dominates_leverage() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let x = Mat::from_fn(10, 2, |i, j| if j == 0 { 1.0 } else { values[i] });
        let h = compute_leverage(&x).unwrap();
        assert!(h[9] > 0.9);
        for i in 0..9 {
            assert!(h[i] < 2.0 * 2.0 / 10.0);
        }
    }
}
