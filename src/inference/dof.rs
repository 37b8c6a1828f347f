//! Residual degrees of freedom and the small-sample covariance correction.

use crate::core::{RegressionError, VceSpec};
use crate::sample::GroupIndex;

/// Degrees of freedom used for inference, and the factor applied to the
/// raw covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreesOfFreedom {
    /// `N - K`, or `G - 1` under clustering.
    pub residual_df: usize,
    /// Multiplier applied to the sandwich.
    pub vce_correction: f64,
    /// Number of clusters, when clustering.
    pub n_clusters: Option<usize>,
}

/// Degrees of freedom and covariance correction for a fit with `n`
/// observations and `k` estimated parameters (absorbed effects included).
///
/// | VCE | df | correction |
/// |-----|----|------------|
/// | homoskedastic, robust | N - K | N / (N - K) |
/// | HC2, HC3, spatial | N - K | 1 |
/// | cluster | G - 1 | (N-1)/(N-K) · G/(G-1) |
///
/// # Errors
/// `InsufficientObservations` if `n <= k`, or if fewer than two clusters
/// are present.
pub fn degrees_of_freedom(
    vce: &VceSpec,
    n: usize,
    k: usize,
    clusters: Option<&GroupIndex>,
) -> Result<DegreesOfFreedom, RegressionError> {
    if n <= k {
        return Err(RegressionError::InsufficientObservations {
            needed: k + 1,
            got: n,
        });
    }
    let nf = n as f64;
    let kf = k as f64;

    match vce {
        VceSpec::Homoskedastic | VceSpec::Robust => Ok(DegreesOfFreedom {
            residual_df: n - k,
            vce_correction: nf / (nf - kf),
            n_clusters: None,
        }),
        VceSpec::Hc2 | VceSpec::Hc3 | VceSpec::Spatial(_) => Ok(DegreesOfFreedom {
            residual_df: n - k,
            vce_correction: 1.0,
            n_clusters: None,
        }),
        VceSpec::Cluster { column } => {
            let clusters =
                clusters.ok_or_else(|| RegressionError::MissingColumn(column.clone()))?;
            let g = clusters.n_groups();
            if g < 2 {
                return Err(RegressionError::InsufficientObservations { needed: 2, got: g });
            }
            let gf = g as f64;
            Ok(DegreesOfFreedom {
                residual_df: g - 1,
                vce_correction: ((nf - 1.0) / (nf - kf)) * (gf / (gf - 1.0)),
                n_clusters: Some(g),
            })
        }
    }
}

/// Parameters absorbed by the fixed effects.
///
/// One per group, unless the groups are nested within the clusters, in
/// which case the cluster correction already accounts for them.
pub fn absorbed_parameters(groups: Option<&GroupIndex>, clusters: Option<&GroupIndex>) -> usize {
    match (groups, clusters) {
        (None, _) => 0,
        (Some(g), Some(c)) if g.is_nested_in(c) => 0,
        (Some(g), _) => g.n_groups(),
    }
}
