//! Condition number of a design matrix.
//!
//! κ(X) = σ_max / σ_min over the singular values of X. The estimators report
//! it when a Gram matrix turns out to be singular, to tell exact collinearity
//! (κ = ∞) apart from a badly scaled but identified design.
//!
//! # Interpretation
//!
//! - κ < 30: Well-conditioned, stable
//! - 30 ≤ κ < 100: Moderate collinearity
//! - 100 ≤ κ < 1000: High collinearity, potential instability
//! - κ ≥ 1000: Severe collinearity, numerical instability likely
//!
//! # References
//!
//! - Belsley, D.A., Kuh, E. and Welsch, R.E. (1980). Regression Diagnostics.

use faer::Mat;

/// Condition number severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSeverity {
    /// κ < 30
    WellConditioned,
    /// 30 ≤ κ < 100
    Moderate,
    /// 100 ≤ κ < 1000
    High,
    /// κ ≥ 1000, including rank deficiency
    Severe,
}

impl ConditionSeverity {
    /// Classify a condition number.
    pub fn classify(cond: f64) -> Self {
        if cond < 30.0 {
            Self::WellConditioned
        } else if cond < 100.0 {
            Self::Moderate
        } else if cond < 1000.0 {
            Self::High
        } else {
            Self::Severe
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WellConditioned => "well-conditioned",
            Self::Moderate => "moderate collinearity",
            Self::High => "high collinearity",
            Self::Severe => "severe collinearity",
        }
    }
}

/// Condition number of `x`, `f64::INFINITY` if it is rank deficient.
pub fn condition_number(x: &Mat<f64>) -> f64 {
    if x.nrows() == 0 || x.ncols() == 0 {
        return f64::INFINITY;
    }
    let svd = match x.svd() {
        Ok(svd) => svd,
        Err(_) => return f64::INFINITY,
    };
    let s = svd.S();
    let s_col = s.column_vector();

    let mut s_max = f64::NEG_INFINITY;
    let mut s_min = f64::INFINITY;
    for i in 0..s_col.nrows() {
        let si = s_col[i];
        if si > s_max {
            s_max = si;
        }
        if si < s_min {
            s_min = si;
        }
    }

    if s_min <= s_max * f64::EPSILON {
        f64::INFINITY
    } else {
        s_max / s_min
    }
}
