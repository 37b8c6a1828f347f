//! Analytic weights.

mod common;

use anofox_econometrics::prelude::*;
use approx::assert_relative_eq;
use common::generate_linear_dataset;

fn weighted(data: &Dataset, column: &str) -> Result<RegressionResult, RegressionError> {
    let options = RegressionOptions::builder()
        .add_constant(true)
        .weights(column)
        .build()?;
    regress(data, "y", &["x1", "x2"], &options)
}

fn unweighted(data: &Dataset) -> RegressionResult {
    let options = RegressionOptions::builder().add_constant(true).build().unwrap();
    regress(data, "y", &["x1", "x2"], &options).unwrap()
}

const NAMES: [&str; 3] = ["x1", "x2", "_cons"];

#[test]
fn test_equal_weights_match_unweighted() {
    let data = generate_linear_dataset(40, 0.8, 19)
        .with_column("wt", vec![3.0; 40])
        .unwrap();
    let w = weighted(&data, "wt").unwrap();
    let u = unweighted(&data);

    for name in NAMES {
        assert_relative_eq!(w.coefficient(name).unwrap(), u.coefficient(name).unwrap(), epsilon = 1e-10);
        assert_relative_eq!(w.std_error(name).unwrap(), u.std_error(name).unwrap(), epsilon = 1e-10);
    }
}

#[test]
fn test_integer_weights_match_duplicated_rows() {
    let data = generate_linear_dataset(15, 0.8, 29);
    let wt: Vec<f64> = (0..15).map(|i| if i < 5 { 2.0 } else { 1.0 }).collect();
    let data = data.with_column("wt", wt).unwrap();

    let mut duplicated = Dataset::new();
    for name in ["y", "x1", "x2"] {
        let v = data.floats(name).unwrap();
        let mut rows = v.to_vec();
        rows.extend_from_slice(&v[..5]);
        duplicated.insert(name, rows).unwrap();
    }

    let w = weighted(&data, "wt").unwrap();
    let d = unweighted(&duplicated);
    for name in NAMES {
        assert_relative_eq!(w.coefficient(name).unwrap(), d.coefficient(name).unwrap(), epsilon = 1e-10);
    }
}

#[test]
fn test_zero_weight_row_has_no_influence() {
    let data = generate_linear_dataset(25, 0.8, 37);
    let mut wt = vec![1.0; 25];
    wt[0] = 0.0;
    let data = data.with_column("wt", wt).unwrap();

    let mut keep = vec![true; 25];
    keep[0] = false;
    let without_first = data.filter(&keep).unwrap();

    let w = weighted(&data, "wt").unwrap();
    let u = unweighted(&without_first);
    for name in NAMES {
        assert_relative_eq!(w.coefficient(name).unwrap(), u.coefficient(name).unwrap(), epsilon = 1e-10);
    }
    assert_eq!(w.n_observations(), 25);
}

#[test]
fn test_missing_weight_drops_row() {
    let data = generate_linear_dataset(20, 0.8, 41);
    let mut wt = vec![1.0; 20];
    wt[6] = f64::NAN;
    let data = data.with_column("wt", wt).unwrap();

    let fitted = weighted(&data, "wt").unwrap();
    assert_eq!(fitted.n_observations(), 19);
    assert!(!fitted.sample()[6]);
}

#[test]
fn test_invalid_weights() {
    let data = generate_linear_dataset(10, 0.8, 43);

    let mut negative = vec![1.0; 10];
    negative[2] = -1.0;
    let with_negative = data.clone().with_column("wt", negative).unwrap();
    assert!(matches!(
        weighted(&with_negative, "wt"),
        Err(RegressionError::InvalidWeights)
    ));

    let with_zero = data.with_column("wt", vec![0.0; 10]).unwrap();
    assert!(matches!(
        weighted(&with_zero, "wt"),
        Err(RegressionError::InvalidWeights)
    ));
}
