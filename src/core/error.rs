//! Error type shared by every estimation stage.

use thiserror::Error;

/// Errors raised while configuring or running an estimation.
///
/// Variants fall into three families:
///
/// - **Configuration** errors are raised at call entry, before any column is
///   read (see [`RegressionError::is_configuration`]).
/// - **Numerical** errors come from the linear algebra (singular Gram
///   matrices, failed eigendecompositions).
/// - **Data** errors describe unusable input (empty sample, bad weights,
///   mismatched column lengths).
///
/// There is no partial-result mode: any error aborts the whole estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("VCE type '{0}' is not supported")]
    InvalidVceType(String),

    #[error("VCE type conflict: {0}")]
    VceConflict(String),

    #[error("IV method '{0}' is not supported")]
    UnsupportedIvMethod(String),

    #[error("spatial kernel '{0}' is not supported")]
    InvalidKernel(String),

    #[error("spatial bandwidth must be finite and positive, got {0}")]
    InvalidBandwidth(f64),

    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("quantile bounds must satisfy 0 <= low < high <= 1, got ({0}, {1})")]
    InvalidQuantileBounds(f64, f64),

    #[error("no outcome column was specified")]
    MissingOutcome,

    #[error("column '{0}' appears more than once in the model")]
    DuplicateColumn(String),

    #[error("column name '{0}' is reserved for the constant term")]
    ReservedName(String),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("column '{name}' has {got} rows but the dataset has {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("coefficient '{0}' not found in results")]
    UnknownCoefficient(String),

    #[error("invalid hypothesis: {0}")]
    InvalidHypothesis(String),

    #[error("singular matrix while computing {context}")]
    SingularMatrix { context: &'static str },

    #[error("numerical error: {0}")]
    NumericalError(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("no usable observations remain after sample selection")]
    EmptySample,

    #[error("analytic weights must be finite, non-negative and not all zero")]
    InvalidWeights,

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },
}

impl RegressionError {
    /// True for errors caused by the estimation request itself rather than
    /// by the data or the numerics.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidVceType(_)
                | Self::VceConflict(_)
                | Self::UnsupportedIvMethod(_)
                | Self::InvalidKernel(_)
                | Self::InvalidBandwidth(_)
                | Self::InvalidConfidenceLevel(_)
                | Self::InvalidQuantileBounds(..)
                | Self::MissingOutcome
                | Self::DuplicateColumn(_)
                | Self::ReservedName(_)
        )
    }
}
