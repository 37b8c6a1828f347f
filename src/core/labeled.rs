//! Matrices and vectors whose columns carry regressor names.
//!
//! Regressor names survive every transform (demeaning, weighting, the IV
//! first stage) so that coefficients and covariance entries can be looked up
//! by name at the end.

use crate::core::RegressionError;
use faer::{Col, Mat};

/// Name given to the column of ones added by `add_constant`.
pub const CONSTANT_NAME: &str = "_cons";

/// An `n × k` matrix with one name per column.
#[derive(Debug, Clone)]
pub struct LabeledMatrix {
    names: Vec<String>,
    values: Mat<f64>,
}

impl LabeledMatrix {
    /// Wrap a matrix with its column names.
    pub fn new(names: Vec<String>, values: Mat<f64>) -> Result<Self, RegressionError> {
        if names.len() != values.ncols() {
            return Err(RegressionError::DimensionMismatch {
                expected: values.ncols(),
                got: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// A matrix with `nrows` rows and no columns.
    pub fn empty(nrows: usize) -> Self {
        Self {
            names: Vec::new(),
            values: Mat::zeros(nrows, 0),
        }
    }

    /// Build from named column slices of equal length.
    pub fn from_columns(nrows: usize, columns: &[(&str, &[f64])]) -> Result<Self, RegressionError> {
        for (_, col) in columns {
            if col.len() != nrows {
                return Err(RegressionError::DimensionMismatch {
                    expected: nrows,
                    got: col.len(),
                });
            }
        }
        let values = Mat::from_fn(nrows, columns.len(), |i, j| columns[j].1[i]);
        let names = columns.iter().map(|(n, _)| n.to_string()).collect();
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Mat<f64> {
        &mut self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// True when the matrix has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.ncols() == 0
    }

    /// Index of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Copy of the column called `name`.
    pub fn column(&self, name: &str) -> Option<Col<f64>> {
        let j = self.position(name)?;
        Some(Col::from_fn(self.nrows(), |i| self.values[(i, j)]))
    }

    /// Append a column of ones named [`CONSTANT_NAME`].
    ///
    /// An empty matrix becomes a single constant column.
    pub fn with_constant(&self) -> Self {
        let n = self.nrows();
        let k = self.ncols();
        let values = Mat::from_fn(n, k + 1, |i, j| if j < k { self.values[(i, j)] } else { 1.0 });
        let mut names = self.names.clone();
        names.push(CONSTANT_NAME.to_string());
        Self { names, values }
    }

    /// Horizontal concatenation `[self, other]`.
    pub fn hstack(&self, other: &LabeledMatrix) -> Result<Self, RegressionError> {
        if self.nrows() != other.nrows() {
            return Err(RegressionError::DimensionMismatch {
                expected: self.nrows(),
                got: other.nrows(),
            });
        }
        let k = self.ncols();
        let values = Mat::from_fn(self.nrows(), k + other.ncols(), |i, j| {
            if j < k {
                self.values[(i, j)]
            } else {
                other.values[(i, j - k)]
            }
        });
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        Ok(Self { names, values })
    }
}

/// A vector indexed by regressor name (e.g. the coefficient vector).
#[derive(Debug, Clone)]
pub struct LabeledVector {
    names: Vec<String>,
    values: Col<f64>,
}

impl LabeledVector {
    pub fn new(names: Vec<String>, values: Col<f64>) -> Result<Self, RegressionError> {
        if names.len() != values.nrows() {
            return Err(RegressionError::DimensionMismatch {
                expected: values.nrows(),
                got: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Col<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Value stored under `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.values[i])
    }

    /// `(name, value)` pairs in regressor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), self.values[i]))
    }
}

/// Square matrix labeled by regressor name on both axes.
#[derive(Debug, Clone)]
pub struct CovarianceMatrix {
    names: Vec<String>,
    values: Mat<f64>,
}

impl CovarianceMatrix {
    pub fn new(names: Vec<String>, values: Mat<f64>) -> Result<Self, RegressionError> {
        if values.nrows() != values.ncols() || names.len() != values.ncols() {
            return Err(RegressionError::DimensionMismatch {
                expected: names.len(),
                got: values.ncols(),
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Entry at (`row`, `col`) by regressor name.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        Some(self.values[(self.position(row)?, self.position(col)?)])
    }

    /// Sub-matrix for the given positions, in the given order.
    pub fn select(&self, idx: &[usize]) -> Mat<f64> {
        Mat::from_fn(idx.len(), idx.len(), |i, j| self.values[(idx[i], idx[j])])
    }

    /// True if `|V - V'| <= tol` elementwise.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let k = self.dim();
        (0..k).all(|i| (0..i).all(|j| (self.values[(i, j)] - self.values[(j, i)]).abs() <= tol))
    }
}
