//! # dimcausal-analysis
//!
//! The dimensional-causality pipeline: delay embedding, nearest-neighbor
//! probability estimation, pointwise intrinsic dimension, trimming,
//! aggregation, and the directional decision rule.
//!
//! The method compares the intrinsic dimensions of four reconstructed
//! spaces — X's marginal, Y's marginal, their joint embedding, and a
//! direct-product reference — and reads the causal direction from which
//! marginal the joint space collapses onto.

pub mod dimension;
pub mod embedding;
pub mod engine;
pub mod neighbors;
pub mod statistics;
pub mod trimming;

pub use engine::CausalityEngine;

use dimcausal_core::config::CausalityConfig;
use dimcausal_core::errors::CausalityResult as Result;
use dimcausal_core::result::CausalityResult;
use dimcausal_core::series::TimeSeries;

/// One-shot convenience wrapper: build an engine for `config` and run a
/// single causality query.
pub fn infer_causality(
    x: &TimeSeries,
    y: &TimeSeries,
    config: &CausalityConfig,
) -> Result<CausalityResult> {
    CausalityEngine::new(config.clone())?.infer(x, y)
}
