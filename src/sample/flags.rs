//! Row flags for the estimation sample.

use crate::core::{Dataset, RegressionError};
use std::collections::HashMap;

/// True for rows where none of `columns` is missing.
///
/// # Errors
/// `MissingColumn` if a column does not exist.
pub fn flag_sample(data: &Dataset, columns: &[&str]) -> Result<Vec<bool>, RegressionError> {
    let mut sample = vec![true; data.n_rows()];
    for name in columns {
        let column = data.column(name)?;
        for (row, keep) in sample.iter_mut().enumerate() {
            if *keep && column.is_missing(row) {
                *keep = false;
            }
        }
    }
    Ok(sample)
}

/// True for rows whose `group` value occurs at least twice among the rows
/// flagged in `sample`.
///
/// Group sizes count only sample rows. Rows with a missing key are false.
pub fn flag_nonsingletons(
    data: &Dataset,
    group: &str,
    sample: &[bool],
) -> Result<Vec<bool>, RegressionError> {
    let column = data.column(group)?;
    if sample.len() != column.len() {
        return Err(RegressionError::DimensionMismatch {
            expected: column.len(),
            got: sample.len(),
        });
    }

    let mut counts = HashMap::new();
    for (row, _) in sample.iter().enumerate().filter(|(_, &s)| s) {
        if let Some(key) = column.key_at(row) {
            *counts.entry(key).or_insert(0usize) += 1;
        }
    }

    Ok((0..column.len())
        .map(|row| {
            column
                .key_at(row)
                .and_then(|key| counts.get(&key))
                .is_some_and(|&count| count > 1)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_sample_any_missing() {
        let data = Dataset::new()
            .with_column("y", vec![1.0, f64::NAN, 3.0, 4.0])
            .unwrap()
            .with_column("g", vec![Some("a"), Some("b"), None, Some("a")])
            .unwrap();
        assert_eq!(
            flag_sample(&data, &["y", "g"]).unwrap(),
            vec![true, false, false, true]
        );
        assert_eq!(flag_sample(&data, &[]).unwrap(), vec![true; 4]);
        assert!(flag_sample(&data, &["nope"]).is_err());
    }

    #[test]
    fn test_singletons_counted_within_sample() {
        let data = Dataset::new()
            .with_column("g", vec![1_i64, 1, 2, 2, 3])
            .unwrap();
        // Group 2 becomes a singleton once row 3 is outside the sample.
        let sample = vec![true, true, true, false, true];
        assert_eq!(
            flag_nonsingletons(&data, "g", &sample).unwrap(),
            vec![true, true, false, false, false]
        );
    }

    #[test]
    fn test_missing_key_is_not_a_nonsingleton() {
        let data = Dataset::new()
            .with_column("g", vec![None, None, Some(1_i64), Some(1)])
            .unwrap();
        assert_eq!(
            flag_nonsingletons(&data, "g", &[true; 4]).unwrap(),
            vec![false, false, true, true]
        );
    }
}
