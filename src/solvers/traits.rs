//! Shared estimation pipeline.

use crate::core::{
    CovarianceMatrix, IvSummary, LabeledMatrix, LabeledVector, RegressionError,
    RegressionOptions, RegressionResult, ResultParts, VceSpec,
};
use crate::inference::{
    absorbed_parameters, compute_vce, degrees_of_freedom, CoefficientInference, SandwichInputs,
};
use crate::sample::Sample;
use crate::utils::matrix::{mat_vec, scale};
use faer::{Col, Mat};

/// Point estimates plus the pieces the covariance estimator needs.
pub(crate) struct Estimate {
    pub coefficients: LabeledVector,
    /// `K × L` bread of the sandwich.
    pub bread: Mat<f64>,
    /// `N × L` matrix entering the scores.
    pub score_design: Mat<f64>,
    /// `N × K` design the residuals are computed from.
    pub design: LabeledMatrix,
    pub iv: Option<IvSummary>,
}

/// A linear estimator on a prepared sample.
pub(crate) trait Estimator {
    /// Coefficients and sandwich ingredients. The bread may depend on the
    /// requested covariance estimator.
    fn estimate(&self, sample: &Sample, vce: &VceSpec) -> Result<Estimate, RegressionError>;

    /// Estimated coefficients, before adding absorbed fixed effects.
    fn n_parameters(&self, sample: &Sample) -> usize;
}

/// Estimate, then compute residuals, covariance and inference.
pub(crate) fn run_estimator<E: Estimator>(
    estimator: &E,
    sample: Sample,
    options: &RegressionOptions,
) -> Result<RegressionResult, RegressionError> {
    let vce = options.vce();
    let estimate = estimator.estimate(&sample, vce)?;
    let n = sample.n_obs();

    let beta = estimate.coefficients.values();
    let fitted_values = mat_vec(estimate.design.values(), beta);
    let y = sample.y();
    let residuals = Col::from_fn(n, |i| y[i] - fitted_values[i]);

    let raw_vcov = compute_vce(
        vce,
        &SandwichInputs {
            bread: &estimate.bread,
            design: &estimate.score_design,
            residuals: &residuals,
            clusters: sample.clusters(),
            coordinates: sample.coordinates(),
        },
    )?;

    let k = estimator.n_parameters(&sample) + absorbed_parameters(sample.groups(), sample.clusters());
    let dof = degrees_of_freedom(vce, n, k, sample.clusters())?;
    log::debug!(
        "{} fit: N = {n}, K = {k}, df = {}, vce = {}, correction = {:.6}",
        if estimate.iv.is_some() { "IV" } else { "OLS" },
        dof.residual_df,
        vce.name(),
        dof.vce_correction
    );

    let vcov = CovarianceMatrix::new(
        estimate.coefficients.names().to_vec(),
        scale(&raw_vcov, dof.vce_correction),
    )?;

    let df = dof.residual_df as f64;
    let level = options.confidence_level();
    let std_errors = CoefficientInference::standard_errors(vcov.values());
    let t_statistics = CoefficientInference::t_statistics(beta, &std_errors);
    let p_values = CoefficientInference::p_values(&t_statistics, df);
    let (conf_interval_lower, conf_interval_upper) =
        CoefficientInference::confidence_intervals(beta, &std_errors, df, level);

    let has_constant = sample.groups().is_none() && !options.no_constant();
    let total_outcome = sample.y_total().clone();

    Ok(RegressionResult::from_parts(ResultParts {
        coefficients: estimate.coefficients,
        std_errors,
        t_statistics,
        p_values,
        conf_interval_lower,
        conf_interval_upper,
        confidence_level: level,
        vcov,
        vce: vce.clone(),
        vce_correction: dof.vce_correction,
        fitted_values,
        residuals,
        total_outcome,
        sample: sample.into_mask(),
        n_parameters: k,
        residual_df: dof.residual_df,
        n_clusters: dof.n_clusters,
        has_constant,
        iv: estimate.iv,
    }))
}
