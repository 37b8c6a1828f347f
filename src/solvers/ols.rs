//! Ordinary least squares.

use crate::core::{
    Dataset, Kernel, RegressionError, RegressionOptions, RegressionOptionsBuilder,
    RegressionResult, SpatialConfig, VceSpec, VceType,
};
use crate::sample::{build_sample, ModelColumns, Sample};
use crate::solvers::linear::fit_least_squares;
use crate::solvers::traits::{run_estimator, Estimate, Estimator};

/// OLS with optional fixed effects, analytic weights and any supported
/// covariance estimator.
///
/// # Example
///
/// ```rust,ignore
/// use anofox_econometrics::prelude::*;
///
/// let fitted = OlsRegressor::builder()
///     .outcome("wage")
///     .regressors(&["educ", "exper"])
///     .add_constant(true)
///     .vce(VceType::Robust)
///     .build()?
///     .fit(&data)?;
///
/// println!("educ: {:?}", fitted.coefficient("educ"));
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    columns: ModelColumns,
    options: RegressionOptions,
}

impl OlsRegressor {
    pub fn new(outcome: &str, regressors: &[&str], options: RegressionOptions) -> Self {
        Self {
            columns: ModelColumns::ols(outcome, regressors),
            options,
        }
    }

    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    pub fn columns(&self) -> &ModelColumns {
        &self.columns
    }

    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Fit the model on `data`.
    pub fn fit(&self, data: &Dataset) -> Result<RegressionResult, RegressionError> {
        let sample = build_sample(data, &self.columns, &self.options)?;
        run_estimator(self, sample, &self.options)
    }
}

impl Estimator for OlsRegressor {
    fn estimate(&self, sample: &Sample, _vce: &VceSpec) -> Result<Estimate, RegressionError> {
        let fit = fit_least_squares(sample.y(), sample.x())?;
        Ok(Estimate {
            coefficients: fit.coefficients,
            bread: fit.xtx_inverse,
            score_design: sample.x().values().clone(),
            design: sample.x().clone(),
            iv: None,
        })
    }

    fn n_parameters(&self, sample: &Sample) -> usize {
        sample.x().ncols()
    }
}

/// Regress `outcome` on `regressors`.
pub fn regress(
    data: &Dataset,
    outcome: &str,
    regressors: &[&str],
    options: &RegressionOptions,
) -> Result<RegressionResult, RegressionError> {
    OlsRegressor::new(outcome, regressors, options.clone()).fit(data)
}

/// Builder for [`OlsRegressor`].
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    outcome: Option<String>,
    regressors: Vec<String>,
    options: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    pub fn outcome(mut self, column: impl Into<String>) -> Self {
        self.outcome = Some(column.into());
        self
    }

    pub fn regressor(mut self, column: impl Into<String>) -> Self {
        self.regressors.push(column.into());
        self
    }

    pub fn regressors(mut self, columns: &[&str]) -> Self {
        self.regressors.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Absorb fixed effects for this group column.
    pub fn group(mut self, column: impl Into<String>) -> Self {
        self.options = self.options.group(column);
        self
    }

    pub fn drop_singletons(mut self, drop: bool) -> Self {
        self.options = self.options.drop_singletons(drop);
        self
    }

    pub fn weights(mut self, column: impl Into<String>) -> Self {
        self.options = self.options.weights(column);
        self
    }

    pub fn vce(mut self, vce: VceType) -> Self {
        self.options = self.options.vce(vce);
        self
    }

    pub fn cluster(mut self, column: impl Into<String>) -> Self {
        self.options = self.options.cluster(column);
        self
    }

    /// Spatial HAC with the given coordinate columns.
    pub fn spatial(
        mut self,
        x_column: impl Into<String>,
        y_column: impl Into<String>,
        kernel: Kernel,
        bandwidth: f64,
    ) -> Self {
        self.options = self
            .options
            .spatial(SpatialConfig::new(x_column, y_column, kernel, bandwidth));
        self
    }

    pub fn add_constant(mut self, add: bool) -> Self {
        self.options = self.options.add_constant(add);
        self
    }

    pub fn no_constant(mut self, none: bool) -> Self {
        self.options = self.options.no_constant(none);
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options = self.options.confidence_level(level);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// `MissingOutcome` without an outcome column, plus any error from
    /// [`RegressionOptionsBuilder::build`].
    pub fn build(self) -> Result<OlsRegressor, RegressionError> {
        let outcome = self.outcome.ok_or(RegressionError::MissingOutcome)?;
        let options = self.options.build()?;
        let regressors: Vec<&str> = self.regressors.iter().map(String::as_str).collect();
        Ok(OlsRegressor::new(&outcome, &regressors, options))
    }
}
