//! Causality query configuration.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{CausalityError, CausalityResult};

/// Which pointwise dimension estimator the pipeline uses.
///
/// Selected once at configuration time; the pipeline never switches
/// estimators mid-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Farahmand-Szepesvari-Audibert two-scale estimator:
    /// `d = ln 2 / ln(r_2k / r_k)`.
    #[default]
    Fsa,
    /// Levina-Bickel maximum-likelihood estimator:
    /// `d = (k - 1) / sum_{j<k} ln(r_k / r_j)`.
    LevinaBickel,
}

/// Configuration for one causality query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CausalityConfig {
    /// Embedding dimension m.
    pub embedding_dim: usize,
    /// Time delay tau, in samples.
    pub time_delay: usize,
    /// Neighbor count k. The FSA estimator reads radii at k and 2k, so
    /// every embedded space must hold more than 2k points.
    pub neighbor_count: usize,
    /// Outlier trim threshold in sample standard deviations from the
    /// median. `None` disables the outlier pass; boundary and undefined
    /// trimming always run.
    pub trim_outlier_sigma: Option<f64>,
    /// Minimum surviving estimates per space for a meaningful statistic.
    pub min_sample_size: usize,
    /// Significance level alpha for the decision-rule z-tests.
    pub significance_level: f64,
    /// Keep every r-th reconstructed point (1 = keep all). Decorrelates
    /// consecutive points on oversampled signals.
    pub downsample_rate: usize,
    /// Pointwise dimension estimator.
    pub estimator: EstimatorKind,
}

impl Default for CausalityConfig {
    fn default() -> Self {
        Self {
            embedding_dim: constants::DEFAULT_EMBEDDING_DIM,
            time_delay: constants::DEFAULT_TIME_DELAY,
            neighbor_count: constants::DEFAULT_NEIGHBOR_COUNT,
            trim_outlier_sigma: Some(constants::DEFAULT_TRIM_OUTLIER_SIGMA),
            min_sample_size: constants::DEFAULT_MIN_SAMPLE_SIZE,
            significance_level: constants::DEFAULT_SIGNIFICANCE_LEVEL,
            downsample_rate: constants::DEFAULT_DOWNSAMPLE_RATE,
            estimator: EstimatorKind::default(),
        }
    }
}

impl CausalityConfig {
    /// Validate the configuration before any computation starts.
    pub fn validate(&self) -> CausalityResult<()> {
        if self.embedding_dim < 1 {
            return Err(CausalityError::invalid("embedding_dim", "must be >= 1"));
        }
        if self.time_delay < 1 {
            return Err(CausalityError::invalid("time_delay", "must be >= 1"));
        }
        if self.neighbor_count < 2 {
            return Err(CausalityError::invalid("neighbor_count", "must be >= 2"));
        }
        if let Some(sigma) = self.trim_outlier_sigma {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(CausalityError::invalid(
                    "trim_outlier_sigma",
                    format!("must be finite and > 0, got {sigma}"),
                ));
            }
        }
        if self.min_sample_size < 2 {
            return Err(CausalityError::invalid("min_sample_size", "must be >= 2"));
        }
        if !self.significance_level.is_finite()
            || self.significance_level <= 0.0
            || self.significance_level >= 1.0
        {
            return Err(CausalityError::invalid(
                "significance_level",
                format!("must lie in (0, 1), got {}", self.significance_level),
            ));
        }
        if self.downsample_rate < 1 {
            return Err(CausalityError::invalid("downsample_rate", "must be >= 1"));
        }
        Ok(())
    }

    /// Margin of unreliable points at each end of the series: `(m - 1) * tau`.
    pub fn boundary_margin(&self) -> usize {
        (self.embedding_dim - 1) * self.time_delay
    }
}
