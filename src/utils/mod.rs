//! Linear algebra shared across estimators.

pub(crate) mod matrix;
pub(crate) mod spectral;

pub use matrix::invert_symmetric;
pub use spectral::matrix_rank;
