//! Delay-coordinate embedding (Takens reconstruction).
//!
//! A scalar series of length N embedded with dimension m and delay tau
//! yields N - (m-1)*tau points; point i is
//! `[s(i), s(i+tau), ..., s(i+(m-1)*tau)]`. The joint space concatenates
//! the two marginal embeddings on a shared time index; the direct-product
//! space pairs X coordinates with half-rotated Y coordinates so its
//! dimension approximates dim(X) + dim(Y) — the independence reference.

use dimcausal_core::errors::{CausalityError, CausalityResult};
use dimcausal_core::series::TimeSeries;

/// Embedding configuration: dimension m and delay tau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingSpec {
    pub dim: usize,
    pub delay: usize,
}

impl EmbeddingSpec {
    pub fn new(dim: usize, delay: usize) -> Self {
        Self { dim, delay }
    }

    /// Samples consumed beyond the base index: `(m - 1) * tau`.
    pub fn margin(&self) -> usize {
        (self.dim - 1) * self.delay
    }
}

/// A set of reconstructed points with exclusive ownership of its data.
///
/// Coordinates are stored flat, point-major, so neighbor queries walk
/// contiguous memory.
#[derive(Debug, Clone)]
pub struct EmbeddedSpace {
    dim: usize,
    coords: Vec<f64>,
    time_indices: Vec<usize>,
    /// Boundary margin inherited from the producing spec(s).
    margin: usize,
    /// Length of the originating series (minimum across series for
    /// composite spaces).
    series_len: usize,
}

impl EmbeddedSpace {
    /// Delay-embed a scalar series.
    pub fn delay_embed(series: &TimeSeries, spec: EmbeddingSpec) -> CausalityResult<Self> {
        if spec.dim < 1 {
            return Err(CausalityError::invalid("embedding_dim", "must be >= 1"));
        }
        if spec.delay < 1 {
            return Err(CausalityError::invalid("time_delay", "must be >= 1"));
        }
        let n = series.len();
        let margin = spec.margin();
        if n <= margin {
            return Err(CausalityError::InsufficientPoints {
                required: margin + 1,
                actual: n,
            });
        }

        let point_count = n - margin;
        let samples = series.as_slice();
        let mut coords = Vec::with_capacity(point_count * spec.dim);
        for i in 0..point_count {
            for j in 0..spec.dim {
                coords.push(samples[i + j * spec.delay]);
            }
        }

        Ok(Self {
            dim: spec.dim,
            coords,
            time_indices: (0..point_count).collect(),
            margin,
            series_len: n,
        })
    }

    /// Joint embedding: X and Y coordinates concatenated on the same time
    /// index, over the intersection of the two valid index ranges.
    ///
    /// Expects freshly embedded marginals (contiguous time indices from 0);
    /// the engine downsamples only after composing spaces.
    pub fn joint(x: &EmbeddedSpace, y: &EmbeddedSpace) -> CausalityResult<Self> {
        debug_assert!(x.has_contiguous_indices() && y.has_contiguous_indices());
        let point_count = x.len().min(y.len());
        if point_count == 0 {
            return Err(CausalityError::InsufficientPoints { required: 1, actual: 0 });
        }

        let dim = x.dim + y.dim;
        let mut coords = Vec::with_capacity(point_count * dim);
        for i in 0..point_count {
            coords.extend_from_slice(x.point(i));
            coords.extend_from_slice(y.point(i));
        }

        Ok(Self {
            dim,
            coords,
            time_indices: (0..point_count).collect(),
            margin: x.margin.max(y.margin),
            series_len: x.series_len.min(y.series_len),
        })
    }

    /// Direct-product reference space: X coordinates of point i paired with
    /// Y coordinates of point `(i + P/2) mod P`.
    ///
    /// The half-rotation decorrelates the two halves deterministically (no
    /// RNG), so the product dimension approximates dim(X) + dim(Y) even
    /// when the underlying systems are coupled.
    pub fn direct_product(x: &EmbeddedSpace, y: &EmbeddedSpace) -> CausalityResult<Self> {
        debug_assert!(x.has_contiguous_indices() && y.has_contiguous_indices());
        let point_count = x.len().min(y.len());
        if point_count == 0 {
            return Err(CausalityError::InsufficientPoints { required: 1, actual: 0 });
        }

        let rotation = point_count / 2;
        let dim = x.dim + y.dim;
        let mut coords = Vec::with_capacity(point_count * dim);
        for i in 0..point_count {
            coords.extend_from_slice(x.point(i));
            coords.extend_from_slice(y.point((i + rotation) % point_count));
        }

        Ok(Self {
            dim,
            coords,
            time_indices: (0..point_count).collect(),
            margin: x.margin.max(y.margin),
            series_len: x.series_len.min(y.series_len),
        })
    }

    /// Keep every `rate`-th point. Time indices are preserved, so boundary
    /// trimming still sees original positions.
    pub fn downsample(self, rate: usize) -> Self {
        if rate <= 1 {
            return self;
        }
        let kept: Vec<usize> = (0..self.len()).step_by(rate).collect();
        let mut coords = Vec::with_capacity(kept.len() * self.dim);
        let mut time_indices = Vec::with_capacity(kept.len());
        for &i in &kept {
            coords.extend_from_slice(self.point(i));
            time_indices.push(self.time_indices[i]);
        }
        Self {
            dim: self.dim,
            coords,
            time_indices,
            margin: self.margin,
            series_len: self.series_len,
        }
    }

    pub fn len(&self) -> usize {
        self.time_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_indices.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn point(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    pub fn time_index(&self, i: usize) -> usize {
        self.time_indices[i]
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn series_len(&self) -> usize {
        self.series_len
    }

    fn has_contiguous_indices(&self) -> bool {
        self.time_indices.iter().enumerate().all(|(i, &t)| i == t)
    }
}
