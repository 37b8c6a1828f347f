//! Instrumental variables: two-stage least squares and LIML.
//!
//! Notation: `y` outcome, `X` endogenous regressors, `Z` excluded
//! instruments, `W` included instruments (exogenous regressors). The
//! full instrument set is `[Z, W]` and the structural design is `[X, W]`.

use crate::core::{
    Dataset, IvMethod, IvSummary, Kernel, LabeledMatrix, LabeledVector, RegressionError,
    RegressionOptions, RegressionOptionsBuilder, RegressionResult, SpatialConfig, VceSpec,
    VceType,
};
use crate::sample::{build_sample, ModelColumns, Sample};
use crate::solvers::linear::fit_least_squares;
use crate::solvers::traits::{run_estimator, Estimate, Estimator};
use crate::utils::invert_symmetric;
use crate::utils::matrix::{
    cross, cross_vec, gram, mat_mul, mat_vec, sandwich, subtract, symmetrize,
};
use crate::utils::spectral::{inverse_sqrt_symmetric, min_eigenvalue};
use faer::{Col, Mat};

/// IV regression of `outcome` on endogenous and exogenous regressors.
///
/// # Example
///
/// ```rust,ignore
/// let fitted = IvRegressor::builder()
///     .outcome("lwage")
///     .endogenous(&["educ"])
///     .excluded_instruments(&["nearc4", "nearc2"])
///     .included_instruments(&["exper"])
///     .method(IvMethod::Liml)
///     .add_constant(true)
///     .build()?
///     .fit(&data)?;
///
/// println!("kappa = {:?}", fitted.kappa());
/// ```
#[derive(Debug, Clone)]
pub struct IvRegressor {
    columns: ModelColumns,
    method: IvMethod,
    kappa_override: Option<f64>,
    options: RegressionOptions,
}

impl IvRegressor {
    pub fn new(
        outcome: &str,
        endogenous: &[&str],
        excluded: &[&str],
        included: &[&str],
        method: IvMethod,
        options: RegressionOptions,
    ) -> Self {
        Self {
            columns: ModelColumns::iv(outcome, endogenous, excluded, included),
            method,
            kappa_override: None,
            options,
        }
    }

    pub fn builder() -> IvRegressorBuilder {
        IvRegressorBuilder::default()
    }

    /// Fix κ instead of estimating it (LIML only). κ = 0 gives OLS on
    /// `[X, W]`; κ = 1 gives 2SLS.
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa_override = Some(kappa);
        self
    }

    pub fn method(&self) -> IvMethod {
        self.method
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
        log::debug!(
            "{} with {} endogenous, {} excluded and {} included instruments",
            self.method,
            sample.x().ncols(),
            sample.z().ncols(),
            sample.w().ncols()
        );
        run_estimator(self, sample, &self.options)
    }

    fn two_stage(&self, sample: &Sample) -> Result<Estimate, RegressionError> {
        let (x_hat, x_true) = first_stage(sample.x(), sample.z(), sample.w())?;
        let fit = fit_least_squares(sample.y(), &x_hat)?;
        Ok(Estimate {
            coefficients: fit.coefficients,
            bread: fit.xtx_inverse,
            score_design: x_hat.values().clone(),
            design: x_true,
            iv: Some(IvSummary {
                method: IvMethod::TwoStageLeastSquares,
                kappa: 1.0,
            }),
        })
    }

    fn liml(&self, sample: &Sample, vce: &VceSpec) -> Result<Estimate, RegressionError> {
        let (y, x, z, w) = (sample.y(), sample.x(), sample.z(), sample.w());
        let instruments = z.hstack(w)?;
        let regressors = x.hstack(w)?;
        let zz_inv = invert_symmetric(&gram(instruments.values()), "Z'Z")?;

        let kappa = match self.kappa_override {
            Some(kappa) => kappa,
            None if x.ncols() == z.ncols() => 1.0,
            None => liml_kappa(y, x, w, instruments.values(), &zz_inv)?,
        };
        log::debug!("LIML kappa = {kappa:.6}");

        let xx = gram(regressors.values());
        let xz = cross(regressors.values(), instruments.values());
        let xy = cross_vec(regressors.values(), y);
        let zy = cross_vec(instruments.values(), y);

        // X'Z (Z'Z)^-1, K × L
        let projector = mat_mul(&xz, &zz_inv);
        let xpzx = sandwich(&xz, &zz_inv);
        let xpzy = mat_vec(&projector, &zy);

        let k = regressors.ncols();
        let a = Mat::from_fn(k, k, |i, j| (1.0 - kappa) * xx[(i, j)] + kappa * xpzx[(i, j)]);
        let b = Col::from_fn(k, |i| (1.0 - kappa) * xy[i] + kappa * xpzy[i]);
        let a_inv = invert_symmetric(&symmetrize(&a), "LIML normal equations")?;
        let beta = mat_vec(&a_inv, &b);

        let bread = if vce.is_homoskedastic() {
            a_inv
        } else {
            mat_mul(&a_inv, &projector)
        };
        let score_design = if vce.is_homoskedastic() {
            regressors.values().clone()
        } else {
            instruments.values().clone()
        };

        Ok(Estimate {
            coefficients: LabeledVector::new(regressors.names().to_vec(), beta)?,
            bread,
            score_design,
            design: regressors,
            iv: Some(IvSummary {
                method: IvMethod::Liml,
                kappa,
            }),
        })
    }
}

impl Estimator for IvRegressor {
    fn estimate(&self, sample: &Sample, vce: &VceSpec) -> Result<Estimate, RegressionError> {
        match self.method {
            IvMethod::TwoStageLeastSquares => self.two_stage(sample),
            IvMethod::Liml => self.liml(sample, vce),
        }
    }

    fn n_parameters(&self, sample: &Sample) -> usize {
        sample.x().ncols() + sample.w().ncols()
    }
}

/// First stage: project each endogenous column on `[Z, W]`.
///
/// Returns `(X̂, X_true)`, both laid out as `[X, W]` with the same names.
pub fn first_stage(
    x: &LabeledMatrix,
    z: &LabeledMatrix,
    w: &LabeledMatrix,
) -> Result<(LabeledMatrix, LabeledMatrix), RegressionError> {
    let instruments = z.hstack(w)?;
    let x_true = x.hstack(w)?;
    let mut x_hat = x_true.clone();
    let n = x.nrows();

    for j in 0..x.ncols() {
        let target = Col::from_fn(n, |i| x.values()[(i, j)]);
        let fit = fit_least_squares(&target, &instruments)?;
        let fitted = fit.fitted(&instruments);
        let values = x_hat.values_mut();
        for i in 0..n {
            values[(i, j)] = fitted[i];
        }
    }
    Ok((x_hat, x_true))
}

/// Smallest eigenvalue of `(Y'M_Z Y)^{-1/2} Y'M_W Y (Y'M_Z Y)^{-1/2}` with
/// `Y = [y, X]`, `M_A` the annihilator of `A` and `M_W = I` without
/// included instruments.
pub fn liml_kappa(
    y: &Col<f64>,
    x: &LabeledMatrix,
    w: &LabeledMatrix,
    instruments: &Mat<f64>,
    zz_inv: &Mat<f64>,
) -> Result<f64, RegressionError> {
    let n = y.nrows();
    let outcomes = Mat::from_fn(n, x.ncols() + 1, |i, j| {
        if j == 0 {
            y[i]
        } else {
            x.values()[(i, j - 1)]
        }
    });
    let yy = gram(&outcomes);

    let yz = cross(&outcomes, instruments);
    let resid_z = subtract(&yy, &sandwich(&yz, zz_inv));
    let root_inv = inverse_sqrt_symmetric(&resid_z, "Y'M_Z Y")?;

    let resid_w = if w.is_empty() {
        yy
    } else {
        let ww_inv = invert_symmetric(&gram(w.values()), "W'W")?;
        let yw = cross(&outcomes, w.values());
        subtract(&yy, &sandwich(&yw, &ww_inv))
    };

    min_eigenvalue(&symmetrize(&sandwich(&root_inv, &resid_w)))
}

/// IV regression in one call.
pub fn iv_regress(
    data: &Dataset,
    outcome: &str,
    endogenous: &[&str],
    excluded: &[&str],
    included: &[&str],
    method: IvMethod,
    options: &RegressionOptions,
) -> Result<RegressionResult, RegressionError> {
    IvRegressor::new(outcome, endogenous, excluded, included, method, options.clone()).fit(data)
}

/// Builder for [`IvRegressor`].
#[derive(Debug, Clone, Default)]
pub struct IvRegressorBuilder {
    outcome: Option<String>,
    endogenous: Vec<String>,
    excluded: Vec<String>,
    included: Vec<String>,
    method: IvMethod,
    kappa: Option<f64>,
    options: RegressionOptionsBuilder,
}

impl IvRegressorBuilder {
    pub fn outcome(mut self, column: impl Into<String>) -> Self {
        self.outcome = Some(column.into());
        self
    }

    pub fn endogenous(mut self, columns: &[&str]) -> Self {
        self.endogenous.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn excluded_instruments(mut self, columns: &[&str]) -> Self {
        self.excluded.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn included_instruments(mut self, columns: &[&str]) -> Self {
        self.included.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Estimator; default 2SLS.
    pub fn method(mut self, method: IvMethod) -> Self {
        self.method = method;
        self
    }

    /// Fix the LIML κ.
    pub fn kappa(mut self, kappa: f64) -> Self {
        self.kappa = Some(kappa);
        self
    }

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

    /// Append a constant to the included instruments.
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

    pub fn build(self) -> Result<IvRegressor, RegressionError> {
        let outcome = self.outcome.ok_or(RegressionError::MissingOutcome)?;
        let options = self.options.build()?;
        fn as_refs(columns: &[String]) -> Vec<&str> {
            columns.iter().map(String::as_str).collect()
        }
        let mut regressor = IvRegressor::new(
            &outcome,
            &as_refs(&self.endogenous),
            &as_refs(&self.excluded),
            &as_refs(&self.included),
            self.method,
            options,
        );
        regressor.kappa_override = self.kappa;
        Ok(regressor)
    }
}
