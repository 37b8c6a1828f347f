//! Variance-covariance estimators.
//!
//! Every estimator is a sandwich `V = B M B'`, where the bread `B` is
//! `(X'X)^-1` (or its IV analogue) and the meat `M` sums products of the
//! scores `s_i = x_i e_i` of the inner design matrix `X`. The homoskedastic
//! estimator is the degenerate case `s² B` with `s² = e'e / N`.
//!
//! | VCE | meat |
//! |-----|------|
//! | robust (HC1) | `Σ s_i s_i'` |
//! | HC2 | `Σ s_i s_i' / (1 - h_i)` |
//! | HC3 | `Σ s_i s_i' / (1 - h_i)²` |
//! | cluster | `Σ_g (Σ_{i∈g} s_i)(Σ_{i∈g} s_i)'` |
//! | spatial HAC | `Σ_i Σ_j k(d_ij) s_i s_j'` |
//!
//! The returned matrix is symmetrized and carries no small-sample
//! correction; see [`degrees_of_freedom`](super::degrees_of_freedom).
//!
//! # References
//!
//! - White, H. (1980). "A Heteroskedasticity-Consistent Covariance Matrix Estimator
//!   and a Direct Test for Heteroskedasticity." *Econometrica*, 48(4), 817–838.
//! - MacKinnon, J.G. & White, H. (1985). "Some Heteroskedasticity-Consistent
//!   Covariance Matrix Estimators with Improved Finite Sample Properties."
//!   *Journal of Econometrics*, 29(3), 305–325.
//! - Conley, T.G. (1999). "GMM Estimation with Cross Sectional Dependence."
//!   *Journal of Econometrics*, 92(1), 1–45.

use crate::core::{Kernel, RegressionError, VceSpec};
use crate::diagnostics::compute_leverage;
use crate::sample::{Coordinates, GroupIndex};
use crate::utils::matrix::{cross, gram, sandwich, scale, symmetrize};
use faer::{Col, Mat};

/// Small-sample leverage correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeverageCorrection {
    /// Scores divided by `sqrt(1 - h_i)`.
    Hc2,
    /// Scores divided by `1 - h_i`.
    Hc3,
}

/// Everything a covariance estimator needs from a fit.
#[derive(Debug, Clone, Copy)]
pub struct SandwichInputs<'a> {
    /// `K × L` bread. Square for OLS; `L > K` for LIML with a robust VCE.
    pub bread: &'a Mat<f64>,
    /// `N × L` matrix whose rows enter the scores.
    pub design: &'a Mat<f64>,
    pub residuals: &'a Col<f64>,
    pub clusters: Option<&'a GroupIndex>,
    pub coordinates: Option<&'a Coordinates>,
}

/// Compute the (uncorrected, symmetrized) covariance requested by `vce`.
///
/// # Errors
/// `DimensionMismatch` for inconsistent inputs, `MissingColumn` if the
/// clusters or coordinates the estimator needs were not supplied, and
/// `SingularMatrix` if the leverage of an HC2/HC3 fit cannot be computed.
pub fn compute_vce(vce: &VceSpec, inputs: &SandwichInputs<'_>) -> Result<Mat<f64>, RegressionError> {
    let SandwichInputs {
        bread,
        design,
        residuals,
        clusters,
        coordinates,
    } = *inputs;

    if design.nrows() != residuals.nrows() {
        return Err(RegressionError::DimensionMismatch {
            expected: design.nrows(),
            got: residuals.nrows(),
        });
    }
    if bread.ncols() != design.ncols() {
        return Err(RegressionError::DimensionMismatch {
            expected: design.ncols(),
            got: bread.ncols(),
        });
    }

    let raw = match vce {
        VceSpec::Homoskedastic => vce_homoskedastic(bread, residuals),
        VceSpec::Robust => vce_robust(bread, design, residuals),
        VceSpec::Hc2 => vce_leverage(bread, design, residuals, LeverageCorrection::Hc2)?,
        VceSpec::Hc3 => vce_leverage(bread, design, residuals, LeverageCorrection::Hc3)?,
        VceSpec::Cluster { column } => {
            let clusters =
                clusters.ok_or_else(|| RegressionError::MissingColumn(column.clone()))?;
            vce_cluster(bread, design, residuals, clusters)?
        }
        VceSpec::Spatial(config) => {
            let coordinates = coordinates
                .ok_or_else(|| RegressionError::MissingColumn(config.x_column.clone()))?;
            vce_spatial(
                bread,
                design,
                residuals,
                coordinates,
                config.kernel,
                config.bandwidth,
            )?
        }
    };
    Ok(symmetrize(&raw))
}

/// `s² B` with `s² = e'e / N`.
pub fn vce_homoskedastic(bread: &Mat<f64>, residuals: &Col<f64>) -> Mat<f64> {
    let n = residuals.nrows();
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();
    let s2 = if n > 0 { ssr / n as f64 } else { f64::NAN };
    scale(bread, s2)
}

/// Scores `x_i e_i`, one row per observation.
pub fn score_matrix(design: &Mat<f64>, residuals: &Col<f64>) -> Mat<f64> {
    Mat::from_fn(design.nrows(), design.ncols(), |i, j| {
        design[(i, j)] * residuals[i]
    })
}

/// White's heteroskedasticity-robust sandwich.
pub fn vce_robust(bread: &Mat<f64>, design: &Mat<f64>, residuals: &Col<f64>) -> Mat<f64> {
    let scores = score_matrix(design, residuals);
    sandwich(bread, &gram(&scores))
}

/// HC2/HC3 sandwich with leverage computed from `design`.
///
/// Observations with `h_i >= 1` keep their unscaled score.
pub fn vce_leverage(
    bread: &Mat<f64>,
    design: &Mat<f64>,
    residuals: &Col<f64>,
    correction: LeverageCorrection,
) -> Result<Mat<f64>, RegressionError> {
    let leverage = compute_leverage(design)?;
    let n = design.nrows();

    let mut saturated = 0usize;
    let divisors: Vec<f64> = (0..n)
        .map(|i| {
            let h = leverage[i];
            if h.is_nan() || h >= 1.0 {
                saturated += 1;
                return 1.0;
            }
            match correction {
                LeverageCorrection::Hc2 => (1.0 - h).sqrt(),
                LeverageCorrection::Hc3 => 1.0 - h,
            }
        })
        .collect();
    if saturated > 0 {
        log::warn!("{saturated} observations have leverage >= 1; their scores are left unscaled");
    }

    let scores = Mat::from_fn(n, design.ncols(), |i, j| {
        design[(i, j)] * residuals[i] / divisors[i]
    });
    Ok(sandwich(bread, &gram(&scores)))
}

/// Cluster-robust sandwich: scores are summed within each cluster first.
pub fn vce_cluster(
    bread: &Mat<f64>,
    design: &Mat<f64>,
    residuals: &Col<f64>,
    clusters: &GroupIndex,
) -> Result<Mat<f64>, RegressionError> {
    if clusters.len() != design.nrows() {
        return Err(RegressionError::DimensionMismatch {
            expected: design.nrows(),
            got: clusters.len(),
        });
    }
    let l = design.ncols();
    let mut summed = Mat::zeros(clusters.n_groups(), l);
    for (i, &g) in clusters.codes().iter().enumerate() {
        let e = residuals[i];
        for j in 0..l {
            summed[(g, j)] += design[(i, j)] * e;
        }
    }
    Ok(sandwich(bread, &gram(&summed)))
}

/// Spatial HAC sandwich with meat `S' W S`, `W_ij = k(d_ij)`.
pub fn vce_spatial(
    bread: &Mat<f64>,
    design: &Mat<f64>,
    residuals: &Col<f64>,
    coordinates: &Coordinates,
    kernel: Kernel,
    bandwidth: f64,
) -> Result<Mat<f64>, RegressionError> {
    if coordinates.len() != design.nrows() {
        return Err(RegressionError::DimensionMismatch {
            expected: design.nrows(),
            got: coordinates.len(),
        });
    }
    let scores = score_matrix(design, residuals);
    let weighted = spatial_weighted_scores(&scores, coordinates, kernel, bandwidth);
    Ok(sandwich(bread, &cross(&scores, &weighted)))
}

/// Row `i` of the result is `Σ_j k(d_ij) s_j`.
///
/// Each row depends only on the inputs, so rows can be computed in any
/// order. Distances are Euclidean in the coordinate units.
pub fn spatial_weighted_scores(
    scores: &Mat<f64>,
    coordinates: &Coordinates,
    kernel: Kernel,
    bandwidth: f64,
) -> Mat<f64> {
    let n = scores.nrows();
    let l = scores.ncols();
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let (xi, yi) = coordinates.point(i);
            let mut acc = vec![0.0; l];
            for j in 0..n {
                let (xj, yj) = coordinates.point(j);
                let distance = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                let w = kernel.weight(distance, bandwidth);
                if w == 0.0 {
                    continue;
                }
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += w * scores[(j, c)];
                }
            }
            acc
        })
        .collect();
    Mat::from_fn(n, l, |i, c| rows[i][c])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::invert_symmetric;
    use approx::assert_relative_eq;

    fn simple_fit() -> (Mat<f64>, Mat<f64>, Col<f64>) {
        let x_data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let y_data = [5.1, 7.8, 11.3, 13.6, 17.5, 19.8, 23.7, 25.2, 29.9, 31.4];
        let n = x_data.len();
        let design = Mat::from_fn(n, 2, |i, j| if j == 0 { x_data[i] } else { 1.0 });

        let x_mean: f64 = x_data.iter().sum::<f64>() / n as f64;
        let y_mean: f64 = y_data.iter().sum::<f64>() / n as f64;
        let mut ss_xy = 0.0;
        let mut ss_xx = 0.0;
        for i in 0..n {
            ss_xy += (x_data[i] - x_mean) * (y_data[i] - y_mean);
            ss_xx += (x_data[i] - x_mean) * (x_data[i] - x_mean);
        }
        let beta1 = ss_xy / ss_xx;
        let beta0 = y_mean - beta1 * x_mean;
        let residuals = Col::from_fn(n, |i| y_data[i] - beta0 - beta1 * x_data[i]);
        let bread = invert_symmetric(&gram(&design), "X'X").unwrap();
        (bread, design, residuals)
    }

    #[test]
    fn test_hc_variants_ordering() {
        let (bread, design, residuals) = simple_fit();
        let hc0 = vce_robust(&bread, &design, &residuals);
        let hc2 = vce_leverage(&bread, &design, &residuals, LeverageCorrection::Hc2).unwrap();
        let hc3 = vce_leverage(&bread, &design, &residuals, LeverageCorrection::Hc3).unwrap();

        // HC3 >= HC2 >= HC0 for the slope variance
        assert!(hc3[(0, 0)] >= hc2[(0, 0)] - 1e-12);
        assert!(hc2[(0, 0)] >= hc0[(0, 0)] - 1e-12);
    }

    #[test]
    fn test_singleton_clusters_match_robust() {
        let (bread, design, residuals) = simple_fit();
        let clusters = GroupIndex::from_keys("id", 0..10);
        let robust = vce_robust(&bread, &design, &residuals);
        let cluster = vce_cluster(&bread, &design, &residuals, &clusters).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(robust[(i, j)], cluster[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_spatial_with_isolated_points_matches_robust() {
        let (bread, design, residuals) = simple_fit();
        let coordinates =
            Coordinates::new((0..10).map(|i| i as f64).collect(), vec![0.0; 10]).unwrap();
        let robust = vce_robust(&bread, &design, &residuals);
        for kernel in [Kernel::Uniform, Kernel::Triangular] {
            let shac =
                vce_spatial(&bread, &design, &residuals, &coordinates, kernel, 0.5).unwrap();
            for i in 0..2 {
                for j in 0..2 {
                    assert_relative_eq!(robust[(i, j)], shac[(i, j)], epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_spatial_single_location_matches_one_cluster() {
        // Every point within the bandwidth of every other: W = 11'.
        let (bread, design, residuals) = simple_fit();
        let coordinates = Coordinates::new(vec![1.0; 10], vec![2.0; 10]).unwrap();
        let one_cluster = GroupIndex::from_keys("c", vec![0; 10]);
        let shac =
            vce_spatial(&bread, &design, &residuals, &coordinates, Kernel::Uniform, 1.0).unwrap();
        let cluster = vce_cluster(&bread, &design, &residuals, &one_cluster).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(shac[(i, j)], cluster[(i, j)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_homoskedastic_scale() {
        let bread = Mat::from_fn(1, 1, |_, _| 2.0);
        let residuals = Col::from_fn(4, |i| [1.0, -1.0, 1.0, -1.0][i]);
        let v = vce_homoskedastic(&bread, &residuals);
        assert_relative_eq!(v[(0, 0)], 2.0);
    }

    #[test]
    fn test_missing_clusters_reported() {
        let (bread, design, residuals) = simple_fit();
        let inputs = SandwichInputs {
            bread: &bread,
            design: &design,
            residuals: &residuals,
            clusters: None,
            coordinates: None,
        };
        let vce = VceSpec::Cluster {
            column: "firm".into(),
        };
        assert!(matches!(
            compute_vce(&vce, &inputs),
            Err(RegressionError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_compute_vce_is_symmetric() {
        let (bread, design, residuals) = simple_fit();
        let inputs = SandwichInputs {
            bread: &bread,
            design: &design,
            residuals: &residuals,
            clusters: None,
            coordinates: None,
        };
        for vce in [VceSpec::Homoskedastic, VceSpec::Robust, VceSpec::Hc2, VceSpec::Hc3] {
            let v = compute_vce(&vce, &inputs).unwrap();
            assert_eq!(v[(0, 1)], v[(1, 0)]);
        }
    }
}
