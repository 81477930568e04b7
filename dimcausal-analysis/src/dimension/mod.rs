//! Pointwise intrinsic dimension estimation.
//!
//! Both estimators read one point's ordered neighbor radii and the
//! associated probability masses, and return a single local dimension or
//! an undefined marker when the radii are degenerate. There is no
//! cross-point coupling, so the whole stage is a rayon map over point
//! indices; the fold back into a Vec preserves point order.

use rayon::prelude::*;

use dimcausal_core::config::EstimatorKind;

use crate::neighbors::NeighborTable;

/// Local dimension estimates for every point of one space, aligned with
/// the space's point indices. `None` marks a degenerate neighborhood.
pub fn local_dimensions(
    table: &NeighborTable,
    k: usize,
    estimator: EstimatorKind,
) -> Vec<Option<f64>> {
    debug_assert!(k >= 2);
    debug_assert!(required_neighbors(k, estimator) <= table.k_max());

    let ln_mass_k = table.ln_mass(k);
    let ln_mass_2k = if estimator == EstimatorKind::Fsa {
        table.ln_mass(2 * k)
    } else {
        0.0
    };

    (0..table.point_count())
        .into_par_iter()
        .map(|i| {
            let radii = table.distances(i);
            match estimator {
                EstimatorKind::Fsa => fsa(radii, k, ln_mass_2k - ln_mass_k),
                EstimatorKind::LevinaBickel => levina_bickel(radii, k),
            }
        })
        .collect()
}

/// Neighbors the chosen estimator reads per point.
pub fn required_neighbors(k: usize, estimator: EstimatorKind) -> usize {
    match estimator {
        EstimatorKind::Fsa => 2 * k,
        EstimatorKind::LevinaBickel => k,
    }
}

/// Farahmand-Szepesvari-Audibert two-scale estimator: the probability mass
/// between the k-th and 2k-th radii grows like r^d, so
/// `d = (ln P_2k - ln P_k) / (ln r_2k - ln r_k)`.
fn fsa(radii: &[f64], k: usize, delta_ln_mass: f64) -> Option<f64> {
    let r_k = radii[k - 1];
    let r_2k = radii[2 * k - 1];
    if r_k <= 0.0 || r_2k <= r_k {
        return None;
    }
    let d = delta_ln_mass / (r_2k.ln() - r_k.ln());
    d.is_finite().then_some(d)
}

/// Levina-Bickel maximum-likelihood estimator:
/// `d = (k - 1) / sum_{j<k} ln(r_k / r_j)`.
fn levina_bickel(radii: &[f64], k: usize) -> Option<f64> {
    let r_k = radii[k - 1];
    if r_k <= 0.0 {
        return None;
    }
    let mut sum = 0.0;
    for &r_j in &radii[..k - 1] {
        if r_j <= 0.0 {
            return None;
        }
        sum += (r_k / r_j).ln();
    }
    if sum <= 0.0 {
        // All radii equal: fewer than two distinct scales.
        return None;
    }
    let d = (k - 1) as f64 / sum;
    d.is_finite().then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddedSpace, EmbeddingSpec};
    use dimcausal_core::series::TimeSeries;

    fn defined_mean(estimates: &[Option<f64>]) -> f64 {
        let defined: Vec<f64> = estimates.iter().flatten().copied().collect();
        defined.iter().sum::<f64>() / defined.len() as f64
    }

    #[test]
    fn test_uniform_grid_is_exactly_one_dimensional() {
        // Interior points of a uniform 1-D grid: r_k = ceil(k/2),
        // r_2k = k, so the FSA ratio recovers d = 1 exactly at even k.
        let series = TimeSeries::new((0..200).map(|i| i as f64).collect()).unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(1, 1)).unwrap();
        let table = NeighborTable::build(&space, 8).unwrap();
        let dims = local_dimensions(&table, 4, EstimatorKind::Fsa);
        // Stay away from the grid edges where neighborhoods are one-sided.
        for i in 20..180 {
            let d = dims[i].unwrap();
            assert!((d - 1.0).abs() < 1e-9, "point {i}: {d}");
        }
    }

    #[test]
    fn test_sinusoid_embeds_as_a_curve() {
        // A sine embedded with m = 2 traces an ellipse: intrinsic
        // dimension 1 despite living in the plane.
        let series =
            TimeSeries::new((0..800).map(|i| (0.37 * i as f64).sin()).collect()).unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(2, 4)).unwrap();
        let table = NeighborTable::build(&space, 16).unwrap();
        let dims = local_dimensions(&table, 8, EstimatorKind::Fsa);
        let mean = defined_mean(&dims);
        assert!((mean - 1.0).abs() < 0.3, "mean dimension {mean}");
    }

    #[test]
    fn test_levina_bickel_on_sinusoid() {
        let series =
            TimeSeries::new((0..800).map(|i| (0.37 * i as f64).sin()).collect()).unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(2, 4)).unwrap();
        let table = NeighborTable::build(&space, 16).unwrap();
        let dims = local_dimensions(&table, 8, EstimatorKind::LevinaBickel);
        let mean = defined_mean(&dims);
        assert!((mean - 1.0).abs() < 0.4, "mean dimension {mean}");
    }

    #[test]
    fn test_constant_series_is_all_undefined() {
        let series = TimeSeries::new(vec![2.0; 60]).unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(2, 1)).unwrap();
        let table = NeighborTable::build(&space, 8).unwrap();
        for estimator in [EstimatorKind::Fsa, EstimatorKind::LevinaBickel] {
            let dims = local_dimensions(&table, 4, estimator);
            assert!(dims.iter().all(Option::is_none), "{estimator:?}");
        }
    }

    #[test]
    fn test_equal_radii_are_undefined() {
        // r_k == r_2k leaves the two-scale ratio without information.
        assert_eq!(fsa(&[1.0, 1.0, 1.0, 1.0], 2, std::f64::consts::LN_2), None);
        // All-equal radii defeat the MLE as well.
        assert_eq!(levina_bickel(&[1.0, 1.0, 1.0, 1.0], 4), None);
    }

    #[test]
    fn test_zero_radius_is_undefined() {
        assert_eq!(fsa(&[0.0, 0.0, 0.0, 1.0], 2, std::f64::consts::LN_2), None);
        assert_eq!(levina_bickel(&[0.0, 1.0, 2.0], 3), None);
    }
}
