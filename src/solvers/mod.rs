//! Estimators: least squares, OLS and instrumental variables.

mod iv;
mod linear;
mod ols;
mod traits;

pub use iv::{first_stage, iv_regress, liml_kappa, IvRegressor, IvRegressorBuilder};
pub use linear::{fit_least_squares, LeastSquaresFit};
pub use ols::{regress, OlsRegressor, OlsRegressorBuilder};
