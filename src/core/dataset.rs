//! In-memory table of named columns handed to the estimators.
//!
//! The estimators never mutate a [`Dataset`]; every stage works on copies
//! of the rows it extracts.

use std::borrow::Cow;

use crate::core::RegressionError;

/// A single named column.
///
/// Numeric columns use `NaN` to mark a missing value. Categorical columns
/// (used as fixed-effect group or cluster keys) use `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values; `NaN` is missing.
    Float(Vec<f64>),
    /// Integer codes; `None` is missing.
    Integer(Vec<Option<i64>>),
    /// String labels; `None` is missing.
    Category(Vec<Option<String>>),
}

/// Hashable view of one cell of a key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum KeyValue<'a> {
    Number(u64),
    Integer(i64),
    Label(&'a str),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Category(v) => v.len(),
        }
    }

    /// True if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the value at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Self::Float(v) => v[row].is_nan(),
            Self::Integer(v) => v[row].is_none(),
            Self::Category(v) => v[row].is_none(),
        }
    }

    /// Numeric view of the column, if it is numeric.
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Values as `f64`, converting integer codes. Missing integers become
    /// `NaN`. `None` for categorical columns.
    pub fn to_f64(&self) -> Option<Cow<'_, [f64]>> {
        match self {
            Self::Float(v) => Some(Cow::Borrowed(v)),
            Self::Integer(v) => Some(Cow::Owned(
                v.iter()
                    .map(|cell| cell.map_or(f64::NAN, |code| code as f64))
                    .collect(),
            )),
            Self::Category(_) => None,
        }
    }

    /// Key used for grouping. `None` for missing cells.
    pub(crate) fn key_at(&self, row: usize) -> Option<KeyValue<'_>> {
        match self {
            Self::Float(v) => {
                let value = v[row];
                if value.is_nan() {
                    None
                } else {
                    // -0.0 and 0.0 belong to the same group
                    let value = if value == 0.0 { 0.0 } else { value };
                    Some(KeyValue::Number(value.to_bits()))
                }
            }
            Self::Integer(v) => v[row].map(KeyValue::Integer),
            Self::Category(v) => v[row].as_deref().map(KeyValue::Label),
        }
    }

    fn select(&self, mask: &[bool]) -> Self {
        fn keep<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, &m)| m)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            Self::Float(v) => Self::Float(keep(v, mask)),
            Self::Integer(v) => Self::Integer(keep(v, mask)),
            Self::Category(v) => Self::Category(keep(v, mask)),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Self::Float(values)
    }
}

impl From<Vec<Option<f64>>> for Column {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self::Float(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Self::Integer(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<i64>>> for Column {
    fn from(values: Vec<Option<i64>>) -> Self {
        Self::Integer(values)
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Self::Category(values.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<&str>>> for Column {
    fn from(values: Vec<Option<&str>>) -> Self {
        Self::Category(values.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Self::Category(values.into_iter().map(Some).collect())
    }
}

/// A table of equally long named columns.
///
/// # Example
///
/// ```rust,ignore
/// use anofox_econometrics::Dataset;
///
/// let data = Dataset::new()
///     .with_column("wage", vec![10.0, 12.5, 9.0, 14.0])?
///     .with_column("educ", vec![12.0, 16.0, 10.0, 18.0])?
///     .with_column("state", vec!["CA", "CA", "NY", "NY"])?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    n_rows: usize,
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column, returning the dataset.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Self, RegressionError> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Add a column, replacing any existing column with the same name.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<(), RegressionError> {
        let name = name.into();
        let column = column.into();

        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(RegressionError::ColumnLength {
                name,
                expected: self.n_rows,
                got: column.len(),
            });
        }

        match self.names.iter().position(|n| *n == name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// True if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, RegressionError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| RegressionError::MissingColumn(name.to_string()))
    }

    /// Borrow a float column by name. Integer columns are rejected; use
    /// [`Dataset::numeric`] to convert them.
    pub fn floats(&self, name: &str) -> Result<&[f64], RegressionError> {
        self.column(name)?
            .as_floats()
            .ok_or_else(|| RegressionError::NonNumericColumn(name.to_string()))
    }

    /// Look up a float or integer column by name, as `f64` values.
    pub fn numeric(&self, name: &str) -> Result<Cow<'_, [f64]>, RegressionError> {
        self.column(name)?
            .to_f64()
            .ok_or_else(|| RegressionError::NonNumericColumn(name.to_string()))
    }

    /// Copy of the dataset restricted to rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Self, RegressionError> {
        if mask.len() != self.n_rows {
            return Err(RegressionError::DimensionMismatch {
                expected: self.n_rows,
                got: mask.len(),
            });
        }
        Ok(Self {
            n_rows: mask.iter().filter(|&&m| m).count(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(mask)).collect(),
        })
    }
}
