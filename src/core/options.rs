//! Estimation options, validated once when they are built.

use crate::core::RegressionError;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Requested variance-covariance estimator.
///
/// Parsed from the usual short names: `robust`/`hc1`, `hc2`, `hc3`,
/// `cluster`, `shac`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VceType {
    /// HC1: White's estimator with the `N/(N-K)` correction.
    Robust,
    /// HC2: scores scaled by `1/sqrt(1-h_i)`.
    Hc2,
    /// HC3: scores scaled by `1/(1-h_i)`.
    Hc3,
    /// Cluster-robust; requires a cluster column.
    Cluster,
    /// Spatial HAC; requires a [`SpatialConfig`].
    Shac,
}

impl FromStr for VceType {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "robust" | "hc1" => Ok(Self::Robust),
            "hc2" => Ok(Self::Hc2),
            "hc3" => Ok(Self::Hc3),
            "cluster" => Ok(Self::Cluster),
            "shac" => Ok(Self::Shac),
            _ => Err(RegressionError::InvalidVceType(s.to_string())),
        }
    }
}

/// Distance kernel for the spatial HAC estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Kernel {
    /// Weight 1 within the bandwidth, 0 outside.
    Uniform,
    /// Weight `1 - d/band` within the bandwidth, 0 outside.
    Triangular,
}

impl Kernel {
    /// Kernel weight for a pair of points `distance` apart.
    #[inline]
    pub fn weight(self, distance: f64, bandwidth: f64) -> f64 {
        if distance > bandwidth {
            return 0.0;
        }
        match self {
            Self::Uniform => 1.0,
            Self::Triangular => 1.0 - distance / bandwidth,
        }
    }
}

impl FromStr for Kernel {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" | "unif" => Ok(Self::Uniform),
            "triangular" | "triangle" | "tria" => Ok(Self::Triangular),
            _ => Err(RegressionError::InvalidKernel(s.to_string())),
        }
    }
}

/// Coordinates, kernel and bandwidth for the spatial HAC estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialConfig {
    /// Column holding the first coordinate (longitude).
    pub x_column: String,
    /// Column holding the second coordinate (latitude).
    pub y_column: String,
    pub kernel: Kernel,
    pub bandwidth: f64,
}

impl SpatialConfig {
    pub fn new(
        x_column: impl Into<String>,
        y_column: impl Into<String>,
        kernel: Kernel,
        bandwidth: f64,
    ) -> Self {
        Self {
            x_column: x_column.into(),
            y_column: y_column.into(),
            kernel,
            bandwidth,
        }
    }

    fn validate(&self) -> Result<(), RegressionError> {
        if !self.bandwidth.is_finite() || self.bandwidth <= 0.0 {
            return Err(RegressionError::InvalidBandwidth(self.bandwidth));
        }
        Ok(())
    }
}

/// Instrumental-variables estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IvMethod {
    /// Two-stage least squares.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "2sls"))]
    TwoStageLeastSquares,
    /// Limited-information maximum likelihood.
    #[cfg_attr(feature = "serde", serde(rename = "liml"))]
    Liml,
}

impl FromStr for IvMethod {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "2sls" | "tsls" => Ok(Self::TwoStageLeastSquares),
            "liml" => Ok(Self::Liml),
            _ => Err(RegressionError::UnsupportedIvMethod(s.to_string())),
        }
    }
}

impl fmt::Display for IvMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoStageLeastSquares => write!(f, "2sls"),
            Self::Liml => write!(f, "liml"),
        }
    }
}

/// Resolved covariance estimator, carrying whatever it needs.
///
/// Produced by [`VceSpec::resolve`] from the user's request and matched
/// exhaustively by the covariance and degrees-of-freedom stages.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VceSpec {
    /// Classical spherical-error covariance.
    #[default]
    Homoskedastic,
    /// HC1.
    Robust,
    Hc2,
    Hc3,
    /// Cluster-robust by the named column.
    Cluster { column: String },
    /// Spatial HAC.
    Spatial(SpatialConfig),
}

impl VceSpec {
    /// Combine an explicit VCE type with the cluster/spatial arguments.
    ///
    /// Rules:
    /// - `cluster` and `spatial` together are a conflict;
    /// - `cluster` with an explicit type other than `Cluster` is a conflict,
    ///   likewise `spatial` with a type other than `Shac`;
    /// - `cluster` implies `Cluster` and `spatial` implies `Shac`;
    /// - `Cluster`/`Shac` without their argument are rejected.
    pub fn resolve(
        vce: Option<VceType>,
        cluster: Option<&str>,
        spatial: Option<&SpatialConfig>,
    ) -> Result<Self, RegressionError> {
        if cluster.is_some() && spatial.is_some() {
            return Err(RegressionError::VceConflict(
                "cluster and spatial HAC cannot be combined".into(),
            ));
        }
        if let (Some(_), Some(t)) = (cluster, vce) {
            if t != VceType::Cluster {
                return Err(RegressionError::VceConflict(format!(
                    "cluster column given with vce type {t:?}"
                )));
            }
        }
        if let (Some(_), Some(t)) = (spatial, vce) {
            if t != VceType::Shac {
                return Err(RegressionError::VceConflict(format!(
                    "spatial HAC arguments given with vce type {t:?}"
                )));
            }
        }

        if let Some(column) = cluster {
            return Ok(Self::Cluster {
                column: column.to_string(),
            });
        }
        if let Some(config) = spatial {
            config.validate()?;
            return Ok(Self::Spatial(config.clone()));
        }

        match vce {
            None => Ok(Self::Homoskedastic),
            Some(VceType::Robust) => Ok(Self::Robust),
            Some(VceType::Hc2) => Ok(Self::Hc2),
            Some(VceType::Hc3) => Ok(Self::Hc3),
            Some(VceType::Cluster) => Err(RegressionError::VceConflict(
                "cluster vce type requires a cluster column".into(),
            )),
            Some(VceType::Shac) => Err(RegressionError::VceConflict(
                "shac vce type requires spatial arguments".into(),
            )),
        }
    }

    /// Short name as used in output tables.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Homoskedastic => "ols",
            Self::Robust => "robust",
            Self::Hc2 => "hc2",
            Self::Hc3 => "hc3",
            Self::Cluster { .. } => "cluster",
            Self::Spatial(_) => "shac",
        }
    }

    pub fn is_homoskedastic(&self) -> bool {
        matches!(self, Self::Homoskedastic)
    }

    /// Cluster column, if clustering.
    pub fn cluster_column(&self) -> Option<&str> {
        match self {
            Self::Cluster { column } => Some(column),
            _ => None,
        }
    }

    /// Spatial arguments, if spatial HAC.
    pub fn spatial(&self) -> Option<&SpatialConfig> {
        match self {
            Self::Spatial(config) => Some(config),
            _ => None,
        }
    }
}

/// Options shared by OLS and IV estimation.
///
/// Immutable once built; construct through [`RegressionOptions::builder`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegressionOptions {
    group: Option<String>,
    drop_singletons: bool,
    weights: Option<String>,
    vce: VceSpec,
    add_constant: bool,
    no_constant: bool,
    confidence_level: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            group: None,
            drop_singletons: true,
            weights: None,
            vce: VceSpec::Homoskedastic,
            add_constant: false,
            no_constant: false,
            confidence_level: 0.95,
        }
    }
}

impl RegressionOptions {
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Fixed-effect group column absorbed by demeaning.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Drop observations in singleton groups (only with a group column).
    pub fn drop_singletons(&self) -> bool {
        self.drop_singletons
    }

    /// Analytic weight column.
    pub fn weights(&self) -> Option<&str> {
        self.weights.as_deref()
    }

    pub fn vce(&self) -> &VceSpec {
        &self.vce
    }

    /// Append a constant to the regressors. Ignored when a group is absorbed.
    pub fn add_constant(&self) -> bool {
        self.add_constant
    }

    /// The regressors carry no constant; only affects the model df.
    pub fn no_constant(&self) -> bool {
        self.no_constant
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// Builder for [`RegressionOptions`].
#[derive(Debug, Clone)]
pub struct RegressionOptionsBuilder {
    group: Option<String>,
    drop_singletons: bool,
    weights: Option<String>,
    vce: Option<VceType>,
    cluster: Option<String>,
    spatial: Option<SpatialConfig>,
    add_constant: bool,
    no_constant: bool,
    confidence_level: f64,
}

impl Default for RegressionOptionsBuilder {
    fn default() -> Self {
        Self {
            group: None,
            drop_singletons: true,
            weights: None,
            vce: None,
            cluster: None,
            spatial: None,
            add_constant: false,
            no_constant: false,
            confidence_level: 0.95,
        }
    }
}

impl RegressionOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb fixed effects for the groups in this column.
    pub fn group(mut self, column: impl Into<String>) -> Self {
        self.group = Some(column.into());
        self
    }

    /// Drop singleton groups before demeaning.
    ///
    /// Default is true.
    pub fn drop_singletons(mut self, drop: bool) -> Self {
        self.drop_singletons = drop;
        self
    }

    /// Use this column as analytic weights.
    pub fn weights(mut self, column: impl Into<String>) -> Self {
        self.weights = Some(column.into());
        self
    }

    /// Explicit covariance estimator.
    pub fn vce(mut self, vce: VceType) -> Self {
        self.vce = Some(vce);
        self
    }

    /// Cluster-robust covariance by this column.
    pub fn cluster(mut self, column: impl Into<String>) -> Self {
        self.cluster = Some(column.into());
        self
    }

    /// Spatial HAC covariance.
    pub fn spatial(mut self, config: SpatialConfig) -> Self {
        self.spatial = Some(config);
        self
    }

    /// Append a constant column named `_cons`.
    ///
    /// Default is false.
    pub fn add_constant(mut self, add: bool) -> Self {
        self.add_constant = add;
        self
    }

    /// Declare that the model has no constant.
    ///
    /// Default is false.
    pub fn no_constant(mut self, none: bool) -> Self {
        self.no_constant = none;
        self
    }

    /// Confidence level for coefficient intervals.
    ///
    /// Default is 0.95.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Validate and freeze the options.
    pub fn build(self) -> Result<RegressionOptions, RegressionError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(RegressionError::InvalidConfidenceLevel(
                self.confidence_level,
            ));
        }
        let vce = VceSpec::resolve(self.vce, self.cluster.as_deref(), self.spatial.as_ref())?;

        Ok(RegressionOptions {
            group: self.group,
            drop_singletons: self.drop_singletons,
            weights: self.weights,
            vce,
            add_constant: self.add_constant,
            no_constant: self.no_constant,
            confidence_level: self.confidence_level,
        })
    }
}
