//! Core types for econometric estimation.

mod dataset;
mod error;
mod labeled;
mod options;
mod result;

pub use dataset::{Column, Dataset};
pub use error::RegressionError;
pub use labeled::{CovarianceMatrix, LabeledMatrix, LabeledVector, CONSTANT_NAME};
pub use options::{
    IvMethod, Kernel, RegressionOptions, RegressionOptionsBuilder, SpatialConfig, VceSpec,
    VceType,
};
pub(crate) use result::ResultParts;
pub use result::{CoefficientSummary, IvSummary, RegressionResult};
