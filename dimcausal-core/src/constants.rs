/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding dimension (m).
pub const DEFAULT_EMBEDDING_DIM: usize = 3;

/// Default time delay (tau), in samples.
pub const DEFAULT_TIME_DELAY: usize = 1;

/// Default neighbor count (k).
pub const DEFAULT_NEIGHBOR_COUNT: usize = 10;

/// Default outlier trim threshold, in sample standard deviations from the median.
pub const DEFAULT_TRIM_OUTLIER_SIGMA: f64 = 3.0;

/// Minimum surviving estimates required for a meaningful dimension statistic.
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 30;

/// Default significance level (alpha) for the decision-rule z-tests.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default downsample rate (1 = keep every reconstructed point).
pub const DEFAULT_DOWNSAMPLE_RATE: usize = 1;

/// Below this point count, neighbor queries fall back to brute force
/// instead of building a k-d tree.
pub const BRUTE_FORCE_THRESHOLD: usize = 64;
