//! # dimcausal-core
//!
//! Foundation crate for the dimensional causality engine.
//! Defines the shared types, configuration, errors, and constants.
//! The analysis crate depends on this.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod result;
pub mod series;

// Re-export the most commonly used types at the crate root.
pub use cancel::CancelToken;
pub use config::{CausalityConfig, EstimatorKind};
pub use errors::{CausalityError, CausalityResult as Result};
pub use result::{CausalDirection, CausalityResult, DimensionStatistic, TrimReport};
pub use series::TimeSeries;
