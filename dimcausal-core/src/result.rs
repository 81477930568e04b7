//! Causality query results and diagnostics.
//!
//! Plain structured records, serde-serializable, with no assumption about
//! the wire format a caller will use.

use serde::{Deserialize, Serialize};

/// Inferred causal direction between the two input series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalDirection {
    /// X drives Y: the joint space collapses onto Y's dynamics.
    XCausesY,
    /// Y drives X.
    YCausesX,
    /// Circular coupling: the marginal and joint spaces share one attractor.
    Both,
    /// Independence: the joint dimension matches the direct-product dimension.
    None,
    /// No significant pattern; a latent common driver cannot be excluded.
    Undetermined,
}

/// Aggregate dimension statistic for one embedded space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionStatistic {
    /// Mean of the surviving pointwise dimension estimates.
    pub mean: f64,
    /// Standard error of the mean, corrected for neighbor overlap
    /// (effective sample count `n / 2k`, not raw n).
    pub std_error: f64,
    /// Number of surviving pointwise estimates.
    pub sample_count: usize,
}

/// Removal counts from one space's trimming pass. Diagnostic only; the
/// removed estimates are never silently discarded without being counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimReport {
    /// Estimates the pointwise estimator marked undefined.
    pub undefined_removed: usize,
    /// Points within the embedding margin of either series end.
    pub boundary_removed: usize,
    /// Statistical outliers beyond the configured sigma threshold.
    pub outlier_removed: usize,
    /// Estimates that survived all passes.
    pub surviving: usize,
}

/// Trim diagnostics for all four embedded spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimDiagnostics {
    pub x: TrimReport,
    pub y: TrimReport,
    pub joint: TrimReport,
    pub product: TrimReport,
}

/// Test statistics behind the decision, kept for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionDiagnostics {
    /// Two-sided p-value for the closeness-gap test
    /// `|m_J - m_X| - |m_J - m_Y|`.
    pub p_gap: f64,
    /// Two-sided p-value for mean(J) = mean(X).
    pub p_joint_vs_x: f64,
    /// Two-sided p-value for mean(J) = mean(Y).
    pub p_joint_vs_y: f64,
    /// Two-sided p-value for mean(J) = mean(Z), the direct-product reference.
    pub p_joint_vs_product: f64,
    /// Normalized gap asymmetry in [-1, 1]; positive favors X -> Y.
    pub gap_asymmetry: f64,
}

/// Result of one causality query. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityResult {
    pub direction: CausalDirection,
    /// Strength of the X -> Y verdict, `max(gap_asymmetry, 0)`.
    pub strength_x_to_y: f64,
    /// Strength of the Y -> X verdict, `max(-gap_asymmetry, 0)`.
    pub strength_y_to_x: f64,
    /// Dimension statistic of X's marginal embedding.
    pub stats_x: DimensionStatistic,
    /// Dimension statistic of Y's marginal embedding.
    pub stats_y: DimensionStatistic,
    /// Dimension statistic of the joint embedding.
    pub stats_joint: DimensionStatistic,
    /// Dimension statistic of the direct-product reference embedding.
    pub stats_product: DimensionStatistic,
    pub trimming: TrimDiagnostics,
    pub decision: DecisionDiagnostics,
}

/// One entry of a neighbor-count sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub neighbor_count: usize,
    pub result: CausalityResult,
}

/// Outcome of exploring a range of neighbor counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub entries: Vec<SweepEntry>,
    /// Majority direction across the sweep; ties resolve to `Undetermined`.
    pub consensus: CausalDirection,
}
