//! Statistical inference: covariance estimators, degrees of freedom,
//! per-coefficient statistics and F tests.

mod coefficient;
mod covariance;
mod dof;
mod hypothesis;

pub use coefficient::CoefficientInference;
pub use covariance::{
    compute_vce, score_matrix, spatial_weighted_scores, vce_cluster, vce_homoskedastic,
    vce_leverage, vce_robust, vce_spatial, LeverageCorrection, SandwichInputs,
};
pub use dof::{absorbed_parameters, degrees_of_freedom, DegreesOfFreedom};
pub use hypothesis::{contrast_matrix, f_test, FTest, HypothesisKind};
