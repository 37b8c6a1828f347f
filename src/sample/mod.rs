//! Estimation sample construction.
//!
//! [`build_sample`] turns a [`Dataset`] plus the model's column roles into
//! the matrices the solvers consume:
//!
//! 1. flag rows with every required value present;
//! 2. drop singleton groups when absorbing fixed effects;
//! 3. extract the outcome and the regressor/instrument blocks;
//! 4. demean within groups, or append a constant;
//! 5. apply analytic weights.
//!
//! The dataset itself is never modified.

mod flags;
mod groups;
mod trim;
mod weights;

pub use flags::{flag_nonsingletons, flag_sample};
pub use groups::GroupIndex;
pub use trim::trim_quantiles;
pub use weights::analytic_row_weights;

use crate::core::{Dataset, LabeledMatrix, RegressionError, RegressionOptions, CONSTANT_NAME};
use faer::{Col, Mat};
use std::collections::HashSet;
use weights::{scale_col, scale_rows};

/// Which block receives the constant column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTarget {
    /// OLS: the regressors.
    Regressors,
    /// IV: the included (exogenous) instruments.
    IncludedInstruments,
}

/// Column roles of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelColumns {
    pub outcome: String,
    /// OLS regressors, or the endogenous regressors of an IV model.
    pub regressors: Vec<String>,
    /// Excluded instruments (IV only).
    pub excluded_instruments: Vec<String>,
    /// Included instruments (IV only).
    pub included_instruments: Vec<String>,
    pub constant_target: ConstantTarget,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl ModelColumns {
    pub fn ols(outcome: &str, regressors: &[&str]) -> Self {
        Self {
            outcome: outcome.to_string(),
            regressors: owned(regressors),
            excluded_instruments: Vec::new(),
            included_instruments: Vec::new(),
            constant_target: ConstantTarget::Regressors,
        }
    }

    pub fn iv(outcome: &str, endogenous: &[&str], excluded: &[&str], included: &[&str]) -> Self {
        Self {
            outcome: outcome.to_string(),
            regressors: owned(endogenous),
            excluded_instruments: owned(excluded),
            included_instruments: owned(included),
            constant_target: ConstantTarget::IncludedInstruments,
        }
    }

    fn model_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.outcome.as_str())
            .chain(self.regressors.iter().map(String::as_str))
            .chain(self.excluded_instruments.iter().map(String::as_str))
            .chain(self.included_instruments.iter().map(String::as_str))
    }

    /// Reject duplicated columns, and `_cons` when a constant will be added.
    pub fn validate(&self, options: &RegressionOptions) -> Result<(), RegressionError> {
        let adds_constant = options.add_constant() && options.group().is_none();
        let mut seen = HashSet::new();
        for name in self.model_names() {
            if !seen.insert(name) {
                return Err(RegressionError::DuplicateColumn(name.to_string()));
            }
            if adds_constant && name == CONSTANT_NAME {
                return Err(RegressionError::ReservedName(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Point coordinates of the sample rows, for spatial HAC.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Coordinates {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, RegressionError> {
        if x.len() != y.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.x[i], self.y[i])
    }
}

/// Transformed estimation sample.
#[derive(Debug, Clone)]
pub struct Sample {
    y: Col<f64>,
    y_total: Col<f64>,
    x: LabeledMatrix,
    z: LabeledMatrix,
    w: LabeledMatrix,
    groups: Option<GroupIndex>,
    clusters: Option<GroupIndex>,
    coordinates: Option<Coordinates>,
    mask: Vec<bool>,
}

impl Sample {
    /// Outcome after demeaning and weighting.
    pub fn y(&self) -> &Col<f64> {
        &self.y
    }

    /// Outcome used for the total sum of squares: the raw (pre-demeaning)
    /// outcome with fixed effects, otherwise [`Sample::y`].
    pub fn y_total(&self) -> &Col<f64> {
        &self.y_total
    }

    /// Regressors (OLS) or endogenous regressors (IV).
    pub fn x(&self) -> &LabeledMatrix {
        &self.x
    }

    /// Excluded instruments.
    pub fn z(&self) -> &LabeledMatrix {
        &self.z
    }

    /// Included instruments.
    pub fn w(&self) -> &LabeledMatrix {
        &self.w
    }

    pub fn groups(&self) -> Option<&GroupIndex> {
        self.groups.as_ref()
    }

    pub fn clusters(&self) -> Option<&GroupIndex> {
        self.clusters.as_ref()
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }

    /// Which dataset rows are in the sample.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn n_obs(&self) -> usize {
        self.y.nrows()
    }

    pub(crate) fn into_mask(self) -> Vec<bool> {
        self.mask
    }
}

fn gather_values(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, &m)| m)
        .map(|(&v, _)| v)
        .collect()
}

fn gather(values: &[f64], mask: &[bool]) -> Col<f64> {
    let kept = gather_values(values, mask);
    Col::from_fn(kept.len(), |i| kept[i])
}

fn gather_block(
    data: &Dataset,
    names: &[String],
    mask: &[bool],
    n: usize,
) -> Result<LabeledMatrix, RegressionError> {
    let rows: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();
    let columns = names
        .iter()
        .map(|name| data.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;
    let values = Mat::from_fn(n, names.len(), |i, j| columns[j][rows[i]]);
    LabeledMatrix::new(names.to_vec(), values)
}

/// Build the estimation sample for `columns` under `options`.
///
/// # Errors
/// Configuration errors from [`ModelColumns::validate`], `MissingColumn` /
/// `NonNumericColumn` for unusable columns, `EmptySample` if no row
/// survives, `InvalidWeights` for bad analytic weights.
pub fn build_sample(
    data: &Dataset,
    columns: &ModelColumns,
    options: &RegressionOptions,
) -> Result<Sample, RegressionError> {
    columns.validate(options)?;

    let vce = options.vce();
    let spatial = vce.spatial();

    // Every numeric input must exist and be numeric before anything else.
    let mut numeric: Vec<&str> = columns.model_names().collect();
    if let Some(config) = spatial {
        numeric.push(&config.x_column);
        numeric.push(&config.y_column);
    }
    if let Some(weights) = options.weights() {
        numeric.push(weights);
    }
    for name in &numeric {
        data.numeric(name)?;
    }

    let mut required = numeric.clone();
    if let Some(group) = options.group() {
        required.push(group);
    }
    if let Some(cluster) = vce.cluster_column() {
        required.push(cluster);
    }

    let mut mask = flag_sample(data, &required)?;
    let complete = mask.iter().filter(|&&m| m).count();

    if let (Some(group), true) = (options.group(), options.drop_singletons()) {
        let nonsingleton = flag_nonsingletons(data, group, &mask)?;
        for (m, keep) in mask.iter_mut().zip(nonsingleton) {
            *m = *m && keep;
        }
        let kept = mask.iter().filter(|&&m| m).count();
        if kept < complete {
            log::debug!("dropped {} singleton observations in '{group}'", complete - kept);
        }
    }

    let n = mask.iter().filter(|&&m| m).count();
    log::debug!("estimation sample: {n} of {} rows", data.n_rows());
    if n == 0 {
        return Err(RegressionError::EmptySample);
    }

    let mut y = gather(&data.numeric(&columns.outcome)?, &mask);
    let mut x = gather_block(data, &columns.regressors, &mask, n)?;
    let mut z = gather_block(data, &columns.excluded_instruments, &mask, n)?;
    let mut w = gather_block(data, &columns.included_instruments, &mask, n)?;

    let groups = match options.group() {
        Some(name) => Some(GroupIndex::factorize(name, data.column(name)?, &mask)?),
        None => None,
    };
    let clusters = match vce.cluster_column() {
        Some(name) => Some(GroupIndex::factorize(name, data.column(name)?, &mask)?),
        None => None,
    };
    let coordinates = match spatial {
        Some(config) => {
            Some(Coordinates::new(
                gather_values(&data.numeric(&config.x_column)?, &mask),
                gather_values(&data.numeric(&config.y_column)?, &mask),
            )?)
        }
        None => None,
    };

    let y_raw = y.clone();
    if let Some(groups) = &groups {
        groups.demean_col(&mut y);
        for block in [&mut x, &mut z, &mut w] {
            groups.demean_matrix(block.values_mut());
        }
        log::debug!(
            "absorbed {} fixed effects from '{}'",
            groups.n_groups(),
            groups.column()
        );
    } else if options.add_constant() {
        match columns.constant_target {
            ConstantTarget::Regressors => x = x.with_constant(),
            ConstantTarget::IncludedInstruments => w = w.with_constant(),
        }
    }

    if let Some(name) = options.weights() {
        let row_weights = analytic_row_weights(&gather_values(&data.numeric(name)?, &mask))?;
        scale_col(&mut y, &row_weights);
        for block in [&mut x, &mut z, &mut w] {
            scale_rows(block.values_mut(), &row_weights);
        }
    }

    let y_total = if groups.is_some() { y_raw } else { y.clone() };

    Ok(Sample {
        y,
        y_total,
        x,
        z,
        w,
        groups,
        clusters,
        coordinates,
        mask,
    })
}
