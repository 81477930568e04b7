//! The Decide stage: hypothesis tests on the aggregated dimension
//! statistics, never single-point comparisons.
//!
//! Primary test: the closeness gap `|m_J - m_X| - |m_J - m_Y|`. A joint
//! space significantly closer to Y's marginal than to X's means X is
//! embedded in Y's dynamics, i.e. X drives Y; symmetrically for the
//! reverse. Without significant asymmetry the equality tests take over:
//! joint equal to both marginals is circular coupling, joint equal to the
//! direct-product reference is independence, anything else stays
//! undetermined (a latent common driver cannot be excluded).

use dimcausal_core::config::CausalityConfig;
use dimcausal_core::result::{
    CausalDirection, CausalityResult, DecisionDiagnostics, DimensionStatistic, TrimDiagnostics,
};

use crate::statistics::{p_two_sided, two_sample_p};

/// Aggregated statistics of the four embedded spaces.
pub(crate) struct SpaceStats {
    pub x: DimensionStatistic,
    pub y: DimensionStatistic,
    pub joint: DimensionStatistic,
    pub product: DimensionStatistic,
}

pub(crate) fn decide(
    config: &CausalityConfig,
    stats: SpaceStats,
    trimming: TrimDiagnostics,
) -> CausalityResult {
    let alpha = config.significance_level;

    let dist_jx = (stats.joint.mean - stats.x.mean).abs();
    let dist_jy = (stats.joint.mean - stats.y.mean).abs();
    let gap = dist_jx - dist_jy;

    // Conservative pooled error for the gap: the absolute values make the
    // exact variance intractable, and overcounting the joint term twice
    // errs toward "not significant".
    let gap_se = (stats.x.std_error.powi(2)
        + stats.y.std_error.powi(2)
        + 2.0 * stats.joint.std_error.powi(2))
    .sqrt();
    let p_gap = if gap_se > 0.0 && gap_se.is_finite() {
        p_two_sided(gap / gap_se)
    } else if gap == 0.0 {
        1.0
    } else {
        0.0
    };

    let p_joint_vs_x = two_sample_p(&stats.joint, &stats.x);
    let p_joint_vs_y = two_sample_p(&stats.joint, &stats.y);
    let p_joint_vs_product = two_sample_p(&stats.joint, &stats.product);

    let direction = if p_gap <= alpha && gap > 0.0 {
        CausalDirection::XCausesY
    } else if p_gap <= alpha && gap < 0.0 {
        CausalDirection::YCausesX
    } else {
        let joint_eq_x = p_joint_vs_x > alpha;
        let joint_eq_y = p_joint_vs_y > alpha;
        let joint_eq_product = p_joint_vs_product > alpha;
        if joint_eq_x && joint_eq_y {
            CausalDirection::Both
        } else if !joint_eq_x && !joint_eq_y && joint_eq_product {
            CausalDirection::None
        } else {
            CausalDirection::Undetermined
        }
    };

    let denom = dist_jx + dist_jy;
    let gap_asymmetry = if denom > 0.0 { gap / denom } else { 0.0 };

    CausalityResult {
        direction,
        strength_x_to_y: gap_asymmetry.max(0.0),
        strength_y_to_x: (-gap_asymmetry).max(0.0),
        stats_x: stats.x,
        stats_y: stats.y,
        stats_joint: stats.joint,
        stats_product: stats.product,
        trimming,
        decision: DecisionDiagnostics {
            p_gap,
            p_joint_vs_x,
            p_joint_vs_y,
            p_joint_vs_product,
            gap_asymmetry,
        },
    }
}
