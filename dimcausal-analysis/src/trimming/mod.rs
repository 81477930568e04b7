//! Removal of unreliable pointwise estimates before aggregation.
//!
//! Three passes, all driven by explicit configuration:
//! undefined estimates, boundary points whose delay window sits within
//! `(m-1)*tau` samples of either series end, and (optionally) statistical
//! outliers beyond a sigma threshold from the median. The outlier pass
//! re-masks until it reaches a fixed point, so re-trimming an already
//! trimmed set with the same sigma removes nothing further. Nothing is
//! discarded silently: every removal is counted in the report.

use dimcausal_core::result::TrimReport;

use crate::embedding::EmbeddedSpace;

/// Surviving estimates plus removal diagnostics for one space.
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub estimates: Vec<f64>,
    pub report: TrimReport,
}

/// Trim one space's local dimension estimates.
///
/// `estimates` is aligned with the space's point indices.
pub fn trim(
    space: &EmbeddedSpace,
    estimates: &[Option<f64>],
    outlier_sigma: Option<f64>,
) -> TrimOutcome {
    debug_assert_eq!(estimates.len(), space.len());
    let margin = space.margin();
    let n = space.series_len();

    let mut report = TrimReport::default();
    let mut surviving = Vec::with_capacity(estimates.len());
    for (i, estimate) in estimates.iter().enumerate() {
        let t = space.time_index(i);
        // Window [t, t + margin]: unreliable when it starts within margin
        // samples of the series start or ends within margin samples of the
        // series end.
        let near_start = t < margin;
        let near_end = n - 1 - (t + margin) < margin;
        if near_start || near_end {
            report.boundary_removed += 1;
            continue;
        }
        match estimate {
            Some(d) => surviving.push(*d),
            None => report.undefined_removed += 1,
        }
    }

    if let Some(sigma) = outlier_sigma {
        let (kept, removed) = outlier_pass(surviving, sigma);
        report.outlier_removed = removed;
        surviving = kept;
    }

    report.surviving = surviving.len();
    TrimOutcome { estimates: surviving, report }
}

/// Remove values beyond `sigma` sample standard deviations from the
/// median, re-masking until convergence (the fixed point makes the pass
/// idempotent). Returns survivors in input order plus the removal count.
fn outlier_pass(mut values: Vec<f64>, sigma: f64) -> (Vec<f64>, usize) {
    let mut removed = 0;
    loop {
        if values.len() < 2 {
            break;
        }
        let center = median(&values);
        let sd = sample_stddev(&values);
        if !sd.is_finite() || sd <= 0.0 {
            break;
        }
        let threshold = sigma * sd;
        let before = values.len();
        values.retain(|v| (v - center).abs() <= threshold);
        let newly_removed = before - values.len();
        if newly_removed == 0 {
            break;
        }
        removed += newly_removed;
    }
    (values, removed)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_stddev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
