//! Integer-coded group keys for fixed effects and clustering.

use crate::core::{Column, RegressionError};
use faer::{Col, Mat};
use std::collections::HashMap;
use std::hash::Hash;

/// Group membership of the sample rows, coded `0..n_groups` in order of
/// first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex {
    column: String,
    codes: Vec<usize>,
    n_groups: usize,
}

impl GroupIndex {
    /// Code an arbitrary key sequence.
    pub fn from_keys<K, I>(column: impl Into<String>, keys: I) -> Self
    where
        K: Hash + Eq,
        I: IntoIterator<Item = K>,
    {
        let mut lookup: HashMap<K, usize> = HashMap::new();
        let codes = keys
            .into_iter()
            .map(|key| {
                let next = lookup.len();
                *lookup.entry(key).or_insert(next)
            })
            .collect();
        Self {
            column: column.into(),
            codes,
            n_groups: lookup.len(),
        }
    }

    /// Code the sample rows of `column`.
    pub(crate) fn factorize(
        name: &str,
        column: &Column,
        sample: &[bool],
    ) -> Result<Self, RegressionError> {
        let keys = (0..column.len())
            .filter(|&row| sample[row])
            .map(|row| {
                column.key_at(row).ok_or_else(|| {
                    RegressionError::NumericalError(format!(
                        "missing key in column '{name}' inside the estimation sample"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_keys(name, keys))
    }

    /// Source column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Group code of each row.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Rows per group.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_groups];
        for &g in &self.codes {
            sizes[g] += 1;
        }
        sizes
    }

    /// True if every group falls inside a single cluster of `clusters`
    /// (or both index the same column).
    pub fn is_nested_in(&self, clusters: &GroupIndex) -> bool {
        if self.column == clusters.column {
            return true;
        }
        if self.codes.len() != clusters.codes.len() {
            return false;
        }
        let mut owner: Vec<Option<usize>> = vec![None; self.n_groups];
        for (&g, &c) in self.codes.iter().zip(&clusters.codes) {
            match owner[g] {
                None => owner[g] = Some(c),
                Some(existing) if existing != c => return false,
                Some(_) => {}
            }
        }
        true
    }

    /// Subtract group means in place.
    pub fn demean_col(&self, values: &mut Col<f64>) {
        let means = self.group_means(|i| values[i]);
        for (i, &g) in self.codes.iter().enumerate() {
            values[i] -= means[g];
        }
    }

    /// Subtract group means from every column in place.
    pub fn demean_matrix(&self, values: &mut Mat<f64>) {
        for j in 0..values.ncols() {
            let means = self.group_means(|i| values[(i, j)]);
            for (i, &g) in self.codes.iter().enumerate() {
                values[(i, j)] -= means[g];
            }
        }
    }

    fn group_means(&self, value: impl Fn(usize) -> f64) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_groups];
        let mut counts = vec![0usize; self.n_groups];
        for (i, &g) in self.codes.iter().enumerate() {
            sums[g] += value(i);
            counts[g] += 1;
        }
        sums.iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect()
    }
}
