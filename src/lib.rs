//! Linear econometric estimators with full statistical inference.
//!
//! This library fits OLS and instrumental-variables (2SLS, LIML) models on
//! a named-column [`Dataset`], with fixed-effect absorption, analytic
//! weights and a choice of covariance estimators: homoskedastic,
//! heteroskedasticity-robust (HC1/HC2/HC3), cluster-robust and spatial HAC.
//!
//! # Example
//!
//! ```rust,ignore
//! use anofox_econometrics::prelude::*;
//!
//! let data = Dataset::new()
//!     .with_column("wage", wage)?
//!     .with_column("educ", educ)?
//!     .with_column("state", state)?;
//!
//! // OLS with state fixed effects and state-clustered errors
//! let options = RegressionOptions::builder()
//!     .group("state")
//!     .cluster("state")
//!     .build()?;
//! let fitted = regress(&data, "wage", &["educ"], &options)?;
//!
//! println!("educ = {:?} ({:?})", fitted.coefficient("educ"), fitted.std_error("educ"));
//! println!("R² = {}", fitted.r_squared());
//!
//! // Joint F test
//! let test = fitted.f_test(&["educ"], HypothesisKind::JointlyZero)?;
//! ```
//!
//! Logging goes through the [`log`] facade: sample construction, fixed
//! effects and covariance choices are reported at `debug`, numerical
//! trouble at `warn`.

pub mod core;
pub mod diagnostics;
pub mod inference;
pub mod sample;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Column, CovarianceMatrix, Dataset, IvMethod, IvSummary, Kernel, LabeledMatrix,
        LabeledVector, RegressionError, RegressionOptions, RegressionOptionsBuilder,
        RegressionResult, SpatialConfig, VceSpec, VceType, CONSTANT_NAME,
    };
    pub use crate::inference::{FTest, HypothesisKind};
    pub use crate::sample::trim_quantiles;
    pub use crate::solvers::{
        iv_regress, regress, IvRegressor, IvRegressorBuilder, OlsRegressor, OlsRegressorBuilder,
    };
}

pub use crate::core::{
    Column, Dataset, IvMethod, Kernel, RegressionError, RegressionOptions,
    RegressionOptionsBuilder, RegressionResult, SpatialConfig, VceSpec, VceType,
};
pub use crate::inference::{FTest, HypothesisKind};
pub use crate::solvers::{iv_regress, regress, IvRegressor, OlsRegressor};
