//! Quantile trimming of outlying rows.

use crate::core::{Dataset, RegressionError};

/// Mask keeping rows whose value in every listed column lies within that
/// column's `(low, high)` quantiles, bounds included.
///
/// Quantiles ignore missing values and interpolate linearly between order
/// statistics. Rows with a missing value in a listed column are dropped.
/// Intersect the mask into the data with [`Dataset::filter`].
///
/// # Errors
/// `InvalidQuantileBounds` unless `0 <= low < high <= 1`, `MissingColumn`
/// or `NonNumericColumn` for unusable columns.
pub fn trim_quantiles(
    data: &Dataset,
    bounds: &[(&str, (f64, f64))],
) -> Result<Vec<bool>, RegressionError> {
    let mut keep = vec![true; data.n_rows()];
    for &(name, (low, high)) in bounds {
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(RegressionError::InvalidQuantileBounds(low, high));
        }
        let values = data.numeric(name)?;

        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let lo_cut = quantile(&sorted, low);
        let hi_cut = quantile(&sorted, high);

        let before = keep.iter().filter(|&&k| k).count();
        for (k, &v) in keep.iter_mut().zip(values.iter()) {
            if !(v >= lo_cut && v <= hi_cut) {
                *k = false;
            }
        }
        log::debug!(
            "trimming '{name}' to [{lo_cut}, {hi_cut}] dropped {} rows",
            before - keep.iter().filter(|&&k| k).count()
        );
    }
    Ok(keep)
}

/// Linear-interpolation quantile of sorted data; `NaN` when empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile(&data, 0.5), 3.0);
        assert_relative_eq!(quantile(&data, 0.1), 1.4, epsilon = 1e-12);
        assert_relative_eq!(quantile(&data, 1.0), 5.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_trim_drops_tails() {
        let values: Vec<f64> = (0..101).map(|i| i as f64).collect();
        let data = Dataset::new().with_column("x", values).unwrap();
        let keep = trim_quantiles(&data, &[("x", (0.05, 0.95))]).unwrap();
        assert_eq!(keep.iter().filter(|&&k| k).count(), 91);
        assert!(!keep[4]);
        assert!(keep[5]);
        assert!(keep[95]);
        assert!(!keep[96]);
    }

    #[test]
    fn test_trim_multiple_columns_and_missing() {
        let data = Dataset::new()
            .with_column("a", vec![1.0, 2.0, 3.0, 4.0, f64::NAN])
            .unwrap()
            .with_column("b", vec![10.0, 20.0, 30.0, 40.0, 50.0])
            .unwrap();
        let keep = trim_quantiles(&data, &[("a", (0.0, 1.0)), ("b", (0.0, 0.75))]).unwrap();
        assert_eq!(keep, vec![true, true, true, true, false]);

        let keep = trim_quantiles(&data, &[("b", (0.0, 0.5))]).unwrap();
        assert_eq!(keep, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_bad_bounds() {
        let data = Dataset::new().with_column("x", vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            trim_quantiles(&data, &[("x", (0.9, 0.1))]),
            Err(RegressionError::InvalidQuantileBounds(..))
        ));
        assert!(trim_quantiles(&data, &[("x", (-0.1, 0.5))]).is_err());
    }
}
