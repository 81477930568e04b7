//! Nearest-neighbor search and local probability estimates.
//!
//! The neighbor table is computed once per embedded space at the largest
//! neighbor count any later stage will read (2k for the two-scale
//! estimator, 2*k_max for a sweep) and sliced per k afterwards. Queries go
//! through a k-d tree; spaces below `BRUTE_FORCE_THRESHOLD` points use a
//! linear scan instead.

pub mod kdtree;

use rayon::prelude::*;
use statrs::function::gamma::ln_gamma;

use dimcausal_core::constants::BRUTE_FORCE_THRESHOLD;
use dimcausal_core::errors::{CausalityError, CausalityResult};

use crate::embedding::EmbeddedSpace;
use kdtree::{dist2, KdTree};

/// Per-point nearest-neighbor distances and indices for a whole space.
///
/// Flat point-major storage: point i owns entries `i*k_max .. (i+1)*k_max`,
/// ordered by increasing (distance, neighbor index).
#[derive(Debug, Clone)]
pub struct NeighborTable {
    k_max: usize,
    point_count: usize,
    space_dim: usize,
    distances: Vec<f64>,
    indices: Vec<u32>,
}

impl NeighborTable {
    /// Compute the k_max nearest neighbors of every point in the space.
    ///
    /// Fails with `InsufficientPoints` when the space cannot supply k_max
    /// neighbors per point (self excluded).
    pub fn build(space: &EmbeddedSpace, k_max: usize) -> CausalityResult<Self> {
        let n = space.len();
        if n <= k_max {
            return Err(CausalityError::InsufficientPoints {
                required: k_max + 1,
                actual: n,
            });
        }

        let per_point: Vec<Vec<(usize, f64)>> = if n < BRUTE_FORCE_THRESHOLD {
            (0..n).map(|i| brute_force_knn(space, i, k_max)).collect()
        } else {
            let tree = KdTree::build(space);
            // Read-only tree shared across the worker pool; results are
            // collected in point order, so the table is deterministic
            // regardless of scheduling.
            (0..n)
                .into_par_iter()
                .map(|i| tree.k_nearest(i, k_max))
                .collect()
        };

        let mut distances = Vec::with_capacity(n * k_max);
        let mut indices = Vec::with_capacity(n * k_max);
        for neighbors in &per_point {
            debug_assert_eq!(neighbors.len(), k_max);
            for &(idx, dist) in neighbors {
                distances.push(dist);
                indices.push(idx as u32);
            }
        }

        Ok(Self {
            k_max,
            point_count: n,
            space_dim: space.dim(),
            distances,
            indices,
        })
    }

    pub fn k_max(&self) -> usize {
        self.k_max
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Ordered neighbor distances of point i.
    pub fn distances(&self, i: usize) -> &[f64] {
        &self.distances[i * self.k_max..(i + 1) * self.k_max]
    }

    /// Ordered neighbor indices of point i.
    pub fn neighbor_indices(&self, i: usize) -> &[u32] {
        &self.indices[i * self.k_max..(i + 1) * self.k_max]
    }

    /// Log probability mass within the j-th neighbor radius (1-based j):
    /// `ln(j / (n - 1))`. Purely a function of rank, shared by all points.
    pub fn ln_mass(&self, j: usize) -> f64 {
        debug_assert!(j >= 1 && j <= self.k_max);
        (j as f64).ln() - ((self.point_count - 1) as f64).ln()
    }

    /// Log local density at point i from its j-th neighbor radius (1-based):
    /// `ln(j / ((n - 1) * V_m(r_j)))` with V_m the m-ball volume in the
    /// embedding dimension, computed in the log domain so large m does not
    /// underflow. `None` when the radius is zero (degenerate neighborhood).
    pub fn ln_density(&self, i: usize, j: usize) -> Option<f64> {
        let r = self.distances(i)[j - 1];
        if r <= 0.0 {
            return None;
        }
        Some(self.ln_mass(j) - ln_ball_volume(self.space_dim, r))
    }
}

/// Log volume of the m-ball: `(m/2) ln pi - ln gamma(m/2 + 1) + m ln r`.
fn ln_ball_volume(dim: usize, radius: f64) -> f64 {
    let m = dim as f64;
    (m / 2.0) * std::f64::consts::PI.ln() - ln_gamma(m / 2.0 + 1.0) + m * radius.ln()
}

/// Linear-scan fallback for small spaces. Same (distance, index) ordering
/// contract as the k-d tree.
fn brute_force_knn(space: &EmbeddedSpace, query: usize, k: usize) -> Vec<(usize, f64)> {
    let q = space.point(query);
    let mut all: Vec<(f64, usize)> = (0..space.len())
        .filter(|&i| i != query)
        .map(|i| (dist2(q, space.point(i)), i))
        .collect();
    all.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    all.truncate(k);
    all.into_iter().map(|(d2, i)| (i, d2.sqrt())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingSpec;
    use dimcausal_core::series::TimeSeries;

    fn uniform_1d(n: usize) -> EmbeddedSpace {
        let series = TimeSeries::new((0..n).map(|i| i as f64).collect()).unwrap();
        EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(1, 1)).unwrap()
    }

    #[test]
    fn test_uniform_1d_matches_reference() {
        // On a uniform 1-D grid the neighbors of an interior point are the
        // alternating adjacent grid points.
        let space = uniform_1d(101);
        let table = NeighborTable::build(&space, 4).unwrap();
        assert_eq!(table.neighbor_indices(50), &[49, 51, 48, 52]);
        assert_eq!(table.distances(50), &[1.0, 1.0, 2.0, 2.0]);
        // Edge point: all neighbors on one side.
        assert_eq!(table.neighbor_indices(0), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_table_and_brute_force_agree_across_threshold() {
        // 200 points exercises the k-d tree path; compare it point by
        // point against the linear scan.
        let series = TimeSeries::new(
            (0..200).map(|i| ((i * 37) % 101) as f64 * 0.42).collect(),
        )
        .unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(3, 2)).unwrap();
        let table = NeighborTable::build(&space, 8).unwrap();
        for i in 0..space.len() {
            let want = brute_force_knn(&space, i, 8);
            let got: Vec<(usize, f64)> = table
                .neighbor_indices(i)
                .iter()
                .zip(table.distances(i))
                .map(|(&idx, &d)| (idx as usize, d))
                .collect();
            assert_eq!(got, want, "point {i}");
        }
    }

    #[test]
    fn test_no_self_reference_and_monotone_distances() {
        let space = uniform_1d(80);
        let table = NeighborTable::build(&space, 10).unwrap();
        for i in 0..space.len() {
            let idx = table.neighbor_indices(i);
            assert!(idx.iter().all(|&j| j as usize != i));
            let d = table.distances(i);
            assert!(d.windows(2).all(|w| w[0] <= w[1]));
            assert!(d.iter().all(|&x| x >= 0.0));
        }
    }

    #[test]
    fn test_insufficient_points() {
        let space = uniform_1d(10);
        let err = NeighborTable::build(&space, 10).unwrap_err();
        assert!(matches!(
            err,
            CausalityError::InsufficientPoints { required: 11, actual: 10 }
        ));
    }

    #[test]
    fn test_ln_density_unit_interval() {
        // 1-D ball of radius r has volume 2r: density at the j-th neighbor
        // of an interior grid point is j / ((n-1) * 2r).
        let space = uniform_1d(101);
        let table = NeighborTable::build(&space, 4).unwrap();
        // Third neighbor of point 50 sits at radius 2: mass 3/100, V = 4.
        let expected = (3.0_f64 / (100.0 * 4.0)).ln();
        let got = table.ln_density(50, 3).unwrap();
        assert!((got - expected).abs() < 1e-12, "got {got}, want {expected}");
    }

    #[test]
    fn test_ln_density_degenerate_radius() {
        let series = TimeSeries::new(vec![5.0; 20]).unwrap();
        let space = EmbeddedSpace::delay_embed(&series, EmbeddingSpec::new(2, 1)).unwrap();
        let table = NeighborTable::build(&space, 3).unwrap();
        assert!(table.ln_density(4, 1).is_none());
    }

    #[test]
    fn test_ln_ball_volume_known_dims() {
        // V_1(r) = 2r, V_2(r) = pi r^2, V_3(r) = 4/3 pi r^3.
        assert!((ln_ball_volume(1, 1.5) - 3.0_f64.ln()).abs() < 1e-12);
        assert!((ln_ball_volume(2, 2.0) - (std::f64::consts::PI * 4.0).ln()).abs() < 1e-12);
        let v3 = 4.0 / 3.0 * std::f64::consts::PI * 8.0;
        assert!((ln_ball_volume(3, 2.0) - v3.ln()).abs() < 1e-12);
    }
}
