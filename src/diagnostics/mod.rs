//! Regression diagnostics.
//!
//! - **Leverage**: hat values used by the HC2/HC3 covariance corrections.
//! - **Condition number**: conditioning of the design matrix, logged by the
//!   estimators before they invert a Gram matrix.
//!
//! ```rust,ignore
//! use anofox_econometrics::diagnostics::compute_leverage;
//!
//! let leverage = compute_leverage(&x)?;
//! ```

mod condition_number;
mod leverage;

pub use condition_number::{condition_number, ConditionSeverity};
pub use leverage::{compute_leverage, leverage_from_inverse};
