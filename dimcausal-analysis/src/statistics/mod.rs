//! Aggregation of trimmed dimension estimates and the two-sample test
//! machinery the decision rule is built on.
//!
//! The standard error uses an effective sample count of `n / 2k` instead
//! of the raw estimate count: pointwise estimates at neighbor count k
//! share most of their 2k-neighbor windows with the surrounding points,
//! so treating them as independent would overstate the confidence of the
//! mean.

use statrs::distribution::{ContinuousCDF, Normal};

use dimcausal_core::errors::{CausalityError, CausalityResult};
use dimcausal_core::result::DimensionStatistic;

/// Aggregate surviving estimates into a dimension statistic.
///
/// Fails with `InsufficientData` when fewer than `min_sample_size`
/// estimates survived trimming; callers surface that as "causality
/// undetermined", never as a panic.
pub fn aggregate(
    estimates: &[f64],
    neighbor_count: usize,
    min_sample_size: usize,
) -> CausalityResult<DimensionStatistic> {
    let n = estimates.len();
    // The sample variance needs two points no matter how permissive the
    // configured minimum is.
    if n < min_sample_size.max(2) {
        return Err(CausalityError::InsufficientData {
            required: min_sample_size.max(2),
            surviving: n,
        });
    }

    let mean = estimates.iter().sum::<f64>() / n as f64;
    let variance =
        estimates.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let effective_n = (n as f64 / (2 * neighbor_count) as f64).max(1.0);
    let std_error = (variance / effective_n).sqrt();

    Ok(DimensionStatistic { mean, std_error, sample_count: n })
}

/// Two-sided p-value for mean(a) = mean(b) under a two-sample z-test.
pub fn two_sample_p(a: &DimensionStatistic, b: &DimensionStatistic) -> f64 {
    let se = (a.std_error.powi(2) + b.std_error.powi(2)).sqrt();
    p_two_sided((a.mean - b.mean) / se_guard(se, a.mean - b.mean))
}

/// Two-sided p-value of a z statistic under the standard normal.
pub fn p_two_sided(z: f64) -> f64 {
    if !z.is_finite() {
        return if z.is_nan() { 1.0 } else { 0.0 };
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * (1.0 - normal.cdf(z.abs())),
        Err(_) => 1.0,
    }
}

/// Degenerate standard errors: identical means are a perfect match,
/// different means with zero spread a certain mismatch.
fn se_guard(se: f64, diff: f64) -> f64 {
    if se > 0.0 && se.is_finite() {
        se
    } else if diff == 0.0 {
        f64::INFINITY
    } else {
        f64::MIN_POSITIVE
    }
}
