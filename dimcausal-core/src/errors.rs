//! Error taxonomy for the causality pipeline.
//!
//! Per-point numerical degeneracies are NOT errors: they are absorbed as
//! undefined estimates, counted by the trimmer, and reported in the
//! result diagnostics. Everything here aborts the whole query.

/// Errors that abort a causality query.
#[derive(Debug, thiserror::Error)]
pub enum CausalityError {
    /// Bad configuration, caught before any computation starts.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: &'static str, reason: String },

    /// Series too short for the requested embedding or neighbor count.
    #[error("insufficient points: need at least {required}, have {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    /// Too many points trimmed to form a reliable statistic.
    #[error("insufficient data after trimming: need {required} estimates, {surviving} survived")]
    InsufficientData { required: usize, surviving: usize },

    /// The query was cancelled via its cancellation token.
    #[error("computation cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

pub type CausalityResult<T> = std::result::Result<T, CausalityError>;

impl CausalityError {
    /// Helper for parameter validation failures.
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}
