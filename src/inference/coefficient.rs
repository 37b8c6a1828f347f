//! Per-coefficient inference from a covariance matrix.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Standard errors, t-statistics, p-values and confidence intervals.
///
/// All statistics use the Student t distribution with the residual degrees
/// of freedom of the fit (`G - 1` under clustering).
pub struct CoefficientInference;

impl CoefficientInference {
    /// Square roots of the covariance diagonal; `NaN` for negative variances.
    pub fn standard_errors(vcov: &Mat<f64>) -> Col<f64> {
        Col::from_fn(vcov.nrows(), |i| {
            let var = vcov[(i, i)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        })
    }

    /// `β / se`; `NaN` where the standard error is not positive.
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |i| {
            let se = std_errors[i];
            if se > 0.0 {
                coefficients[i] / se
            } else {
                f64::NAN
            }
        })
    }

    /// Two-sided p-values `2 · F_t(-|t|; df)`.
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        let dist = StudentsT::new(0.0, 1.0, df).ok();
        Col::from_fn(t_statistics.nrows(), |i| {
            let t = t_statistics[i];
            if t.is_nan() {
                return f64::NAN;
            }
            dist.as_ref().map_or(f64::NAN, |d| 2.0 * d.cdf(-t.abs()))
        })
    }

    /// Two-sided t critical value at `confidence_level`.
    pub fn critical_value(df: f64, confidence_level: f64) -> f64 {
        StudentsT::new(0.0, 1.0, df).map_or(f64::NAN, |d| {
            d.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0)
        })
    }

    /// `β ± t_crit · se`, returned as (lower, upper).
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let t_crit = Self::critical_value(df, confidence_level);
        let k = coefficients.nrows();
        let lower = Col::from_fn(k, |i| coefficients[i] - t_crit * std_errors[i]);
        let upper = Col::from_fn(k, |i| coefficients[i] + t_crit * std_errors[i]);
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_errors_from_diagonal() {
        let vcov = Mat::from_fn(2, 2, |i, j| if i == j { [4.0, -1.0][i] } else { 0.3 });
        let se = CoefficientInference::standard_errors(&vcov);
        assert_eq!(se[0], 2.0);
        assert!(se[1].is_nan());
    }

    #[test]
    fn test_t_and_p_values() {
        let beta = Col::from_fn(3, |i| [2.0, 0.0, 1.0][i]);
        let se = Col::from_fn(3, |i| [1.0, 1.0, 0.0][i]);
        let t = CoefficientInference::t_statistics(&beta, &se);
        assert_eq!(t[0], 2.0);
        assert_eq!(t[1], 0.0);
        assert!(t[2].is_nan());

        let p = CoefficientInference::p_values(&t, 10.0);
        // t = 2 on 10 df
        assert_relative_eq!(p[0], 0.07338803, epsilon = 1e-6);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert!(p[2].is_nan());
    }

    #[test]
    fn test_confidence_intervals() {
        let beta = Col::from_fn(1, |_| 1.0);
        let se = Col::from_fn(1, |_| 0.5);
        let (lo, hi) = CoefficientInference::confidence_intervals(&beta, &se, 20.0, 0.95);
        // t_{0.975, 20} = 2.085963
        assert_relative_eq!(lo[0], 1.0 - 0.5 * 2.085963, epsilon = 1e-5);
        assert_relative_eq!(hi[0], 1.0 + 0.5 * 2.085963, epsilon = 1e-5);
    }
}
