//! Time series input type.

use serde::{Deserialize, Serialize};

use crate::errors::{CausalityError, CausalityResult};

/// An ordered, uniformly sampled, real-valued time series.
///
/// Immutable once constructed. Construction rejects NaN and infinite
/// samples so the numerical pipeline never has to re-check them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from raw samples.
    ///
    /// Fails with `InvalidParameter` if any sample is NaN or infinite,
    /// or if the series is empty.
    pub fn new(samples: Vec<f64>) -> CausalityResult<Self> {
        if samples.is_empty() {
            return Err(CausalityError::invalid("samples", "series must not be empty"));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(CausalityError::invalid(
                "samples",
                format!("non-finite sample at index {pos}"),
            ));
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }
}
