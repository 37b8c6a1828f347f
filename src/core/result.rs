//! Regression results.

use crate::core::{
    CovarianceMatrix, IvMethod, LabeledVector, RegressionError, VceSpec, CONSTANT_NAME,
};
use crate::inference::{contrast_matrix, f_test, FTest, HypothesisKind};
use faer::{Col, Mat};
use std::cell::OnceCell;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// IV-specific output.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IvSummary {
    pub method: IvMethod,
    /// LIML κ; exactly 1 for 2SLS.
    pub kappa: f64,
}

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoefficientSummary {
    pub name: String,
    pub coefficient: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Everything an estimator hands over to build a [`RegressionResult`].
pub(crate) struct ResultParts {
    pub coefficients: LabeledVector,
    pub std_errors: Col<f64>,
    pub t_statistics: Col<f64>,
    pub p_values: Col<f64>,
    pub conf_interval_lower: Col<f64>,
    pub conf_interval_upper: Col<f64>,
    pub confidence_level: f64,
    pub vcov: CovarianceMatrix,
    pub vce: VceSpec,
    pub vce_correction: f64,
    pub fitted_values: Col<f64>,
    pub residuals: Col<f64>,
    pub total_outcome: Col<f64>,
    pub sample: Vec<bool>,
    pub n_parameters: usize,
    pub residual_df: usize,
    pub n_clusters: Option<usize>,
    pub has_constant: bool,
    pub iv: Option<IvSummary>,
}

/// Result of an OLS or IV fit.
///
/// Coefficient statistics are computed eagerly. Fit statistics (sums of
/// squares, R², the overall F test) are computed on first access and
/// cached, so a result is cheap to produce and to query repeatedly.
///
/// # Example
///
/// ```rust,ignore
/// let result = regress(&data, "wage", &["educ", "exper"], &options)?;
/// let educ = result.coefficient("educ").unwrap();
/// let (f, p) = (result.f_statistic(), result.f_pvalue());
/// let joint = result.f_test(&["educ", "exper"], HypothesisKind::JointlyZero)?;
/// ```
#[derive(Debug, Clone)]
pub struct RegressionResult {
    coefficients: LabeledVector,
    std_errors: Col<f64>,
    t_statistics: Col<f64>,
    p_values: Col<f64>,
    conf_interval_lower: Col<f64>,
    conf_interval_upper: Col<f64>,
    confidence_level: f64,
    vcov: CovarianceMatrix,
    vce: VceSpec,
    vce_correction: f64,
    fitted_values: Col<f64>,
    residuals: Col<f64>,
    total_outcome: Col<f64>,
    sample: Vec<bool>,
    n_parameters: usize,
    residual_df: usize,
    n_clusters: Option<usize>,
    has_constant: bool,
    iv: Option<IvSummary>,

    ssr: OnceCell<f64>,
    sst: OnceCell<f64>,
    r_squared: OnceCell<f64>,
    adj_r_squared: OnceCell<f64>,
    overall_f: OnceCell<(f64, f64)>,
}

impl RegressionResult {
    pub(crate) fn from_parts(parts: ResultParts) -> Self {
        Self {
            coefficients: parts.coefficients,
            std_errors: parts.std_errors,
            t_statistics: parts.t_statistics,
            p_values: parts.p_values,
            conf_interval_lower: parts.conf_interval_lower,
            conf_interval_upper: parts.conf_interval_upper,
            confidence_level: parts.confidence_level,
            vcov: parts.vcov,
            vce: parts.vce,
            vce_correction: parts.vce_correction,
            fitted_values: parts.fitted_values,
            residuals: parts.residuals,
            total_outcome: parts.total_outcome,
            sample: parts.sample,
            n_parameters: parts.n_parameters,
            residual_df: parts.residual_df,
            n_clusters: parts.n_clusters,
            has_constant: parts.has_constant,
            iv: parts.iv,
            ssr: OnceCell::new(),
            sst: OnceCell::new(),
            r_squared: OnceCell::new(),
            adj_r_squared: OnceCell::new(),
            overall_f: OnceCell::new(),
        }
    }

    /// Coefficient vector, labeled by regressor.
    pub fn coefficients(&self) -> &LabeledVector {
        &self.coefficients
    }

    /// Coefficient of one regressor.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients.get(name)
    }

    /// Standard error of one regressor.
    pub fn std_error(&self, name: &str) -> Option<f64> {
        self.coefficients.position(name).map(|i| self.std_errors[i])
    }

    pub fn std_errors(&self) -> &Col<f64> {
        &self.std_errors
    }

    pub fn t_statistics(&self) -> &Col<f64> {
        &self.t_statistics
    }

    pub fn p_values(&self) -> &Col<f64> {
        &self.p_values
    }

    pub fn conf_interval_lower(&self) -> &Col<f64> {
        &self.conf_interval_lower
    }

    pub fn conf_interval_upper(&self) -> &Col<f64> {
        &self.conf_interval_upper
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Coefficient covariance matrix (small-sample correction applied).
    pub fn vcov(&self) -> &CovarianceMatrix {
        &self.vcov
    }

    /// Covariance estimator that produced [`RegressionResult::vcov`].
    pub fn vce(&self) -> &VceSpec {
        &self.vce
    }

    /// Factor the raw sandwich was multiplied by.
    pub fn vce_correction(&self) -> f64 {
        self.vce_correction
    }

    /// Fitted values on the transformed (demeaned, weighted) scale.
    pub fn fitted_values(&self) -> &Col<f64> {
        &self.fitted_values
    }

    /// Residuals on the transformed scale.
    pub fn residuals(&self) -> &Col<f64> {
        &self.residuals
    }

    /// Dataset rows used in estimation.
    pub fn sample(&self) -> &[bool] {
        &self.sample
    }

    pub fn n_observations(&self) -> usize {
        self.residuals.nrows()
    }

    /// `K`: estimated coefficients plus absorbed fixed effects.
    pub fn n_parameters(&self) -> usize {
        self.n_parameters
    }

    /// Degrees of freedom for t and F tests (`G - 1` under clustering).
    pub fn residual_df(&self) -> usize {
        self.residual_df
    }

    /// `K - 1` with a constant, `K` without.
    pub fn model_df(&self) -> usize {
        if self.has_constant {
            self.n_parameters.saturating_sub(1)
        } else {
            self.n_parameters
        }
    }

    pub fn n_clusters(&self) -> Option<usize> {
        self.n_clusters
    }

    pub fn iv(&self) -> Option<&IvSummary> {
        self.iv.as_ref()
    }

    pub fn iv_method(&self) -> Option<IvMethod> {
        self.iv.map(|iv| iv.method)
    }

    pub fn kappa(&self) -> Option<f64> {
        self.iv.map(|iv| iv.kappa)
    }

    /// Residual sum of squares.
    pub fn ssr(&self) -> f64 {
        *self
            .ssr
            .get_or_init(|| self.residuals.iter().map(|e| e * e).sum())
    }

    /// Total sum of squares about the mean.
    pub fn sst(&self) -> f64 {
        *self.sst.get_or_init(|| {
            let n = self.total_outcome.nrows();
            if n == 0 {
                return f64::NAN;
            }
            let mean = self.total_outcome.iter().sum::<f64>() / n as f64;
            self.total_outcome.iter().map(|y| (y - mean).powi(2)).sum()
        })
    }

    /// `1 - SSR/SST`; `NaN` for IV fits.
    pub fn r_squared(&self) -> f64 {
        *self.r_squared.get_or_init(|| {
            if self.iv.is_some() {
                return f64::NAN;
            }
            1.0 - self.ssr() / self.sst()
        })
    }

    /// `1 - (SSR/(N-K)) / (SST/(N-1))`; `NaN` for IV fits.
    pub fn adj_r_squared(&self) -> f64 {
        *self.adj_r_squared.get_or_init(|| {
            if self.iv.is_some() {
                return f64::NAN;
            }
            let n = self.n_observations() as f64;
            let k = self.n_parameters as f64;
            1.0 - (self.ssr() / (n - k)) / (self.sst() / (n - 1.0))
        })
    }

    /// F statistic for all coefficients except the constant being zero.
    ///
    /// `NaN` when there is nothing to test or the test cannot be computed.
    pub fn f_statistic(&self) -> f64 {
        self.overall_f().0
    }

    /// p-value of [`RegressionResult::f_statistic`].
    pub fn f_pvalue(&self) -> f64 {
        self.overall_f().1
    }

    fn overall_f(&self) -> (f64, f64) {
        *self.overall_f.get_or_init(|| {
            let names: Vec<&str> = self
                .coefficients
                .names()
                .iter()
                .map(String::as_str)
                .filter(|n| *n != CONSTANT_NAME)
                .collect();
            if names.is_empty() {
                return (f64::NAN, f64::NAN);
            }
            match self.f_test(&names, HypothesisKind::JointlyZero) {
                Ok(test) => (test.statistic, test.p_value),
                Err(err) => {
                    log::debug!("overall F test unavailable: {err}");
                    (f64::NAN, f64::NAN)
                }
            }
        })
    }

    /// F test over named coefficients: jointly zero, or all equal.
    ///
    /// # Errors
    /// `UnknownCoefficient` for a name not in the model, `InvalidHypothesis`
    /// for an empty list (or fewer than two names in an equality test).
    pub fn f_test(&self, names: &[&str], kind: HypothesisKind) -> Result<FTest, RegressionError> {
        let idx = names
            .iter()
            .map(|name| {
                self.coefficients
                    .position(name)
                    .ok_or_else(|| RegressionError::UnknownCoefficient(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let restrictions = contrast_matrix(idx.len(), kind)?;
        let vcov = self.vcov.select(&idx);
        let beta = Col::from_fn(idx.len(), |i| self.coefficients.values()[idx[i]]);
        let r = Col::zeros(restrictions.nrows());
        f_test(&vcov, &restrictions, &beta, &r, self.residual_df)
    }

    /// Wald test of `Rβ = r` over the full coefficient vector.
    pub fn linear_hypothesis(
        &self,
        restrictions: &Mat<f64>,
        r: &Col<f64>,
    ) -> Result<FTest, RegressionError> {
        f_test(
            self.vcov.values(),
            restrictions,
            self.coefficients.values(),
            r,
            self.residual_df,
        )
    }

    /// Coefficient table in regressor order.
    pub fn summary(&self) -> Vec<CoefficientSummary> {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, (name, coefficient))| CoefficientSummary {
                name: name.to_string(),
                coefficient,
                std_error: self.std_errors[i],
                t_statistic: self.t_statistics[i],
                p_value: self.p_values[i],
                conf_low: self.conf_interval_lower[i],
                conf_high: self.conf_interval_upper[i],
            })
            .collect()
    }
}
