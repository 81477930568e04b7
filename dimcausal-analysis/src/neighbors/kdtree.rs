//! k-d tree over an embedded space.
//!
//! Built once per space, immutable afterwards, shared read-only across all
//! per-point queries. Neighbor ordering is fully deterministic: candidates
//! compare by (distance, point index), so equal distances resolve to the
//! lowest index.

use smallvec::SmallVec;

use crate::embedding::EmbeddedSpace;

/// Bounded best-k candidate list ordered by (squared distance, index).
struct Candidates {
    k: usize,
    items: SmallVec<[(f64, u32); 32]>,
}

impl Candidates {
    fn new(k: usize) -> Self {
        Self { k, items: SmallVec::new() }
    }

    fn full(&self) -> bool {
        self.items.len() == self.k
    }

    /// Squared distance a candidate must beat to enter a full list.
    fn worst_dist2(&self) -> f64 {
        if self.full() {
            self.items[self.items.len() - 1].0
        } else {
            f64::INFINITY
        }
    }

    fn push(&mut self, dist2: f64, index: u32) {
        if self.full() {
            let (worst_d, worst_i) = self.items[self.items.len() - 1];
            if dist2 > worst_d || (dist2 == worst_d && index > worst_i) {
                return;
            }
            self.items.pop();
        }
        let pos = self
            .items
            .partition_point(|&(d, i)| d < dist2 || (d == dist2 && i < index));
        self.items.insert(pos, (dist2, index));
    }
}

/// Spatial index over the points of one `EmbeddedSpace`.
pub struct KdTree<'a> {
    space: &'a EmbeddedSpace,
    /// Point indices arranged so every subtree occupies a contiguous slice
    /// with its split point in the middle.
    order: Vec<u32>,
}

impl<'a> KdTree<'a> {
    pub fn build(space: &'a EmbeddedSpace) -> Self {
        let mut order: Vec<u32> = (0..space.len() as u32).collect();
        build_subtree(space, &mut order, 0);
        Self { space, order }
    }

    /// The k nearest neighbors of point `query_index`, excluding itself,
    /// ordered by increasing (distance, index).
    pub fn k_nearest(&self, query_index: usize, k: usize) -> Vec<(usize, f64)> {
        let query = self.space.point(query_index);
        let mut best = Candidates::new(k);
        self.search(0, self.order.len(), 0, query, query_index as u32, &mut best);
        best.items
            .into_iter()
            .map(|(d2, i)| (i as usize, d2.sqrt()))
            .collect()
    }

    fn search(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        query: &[f64],
        exclude: u32,
        best: &mut Candidates,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let node = self.order[mid];
        if node != exclude {
            best.push(dist2(query, self.space.point(node as usize)), node);
        }
        if hi - lo == 1 {
            return;
        }

        let axis = depth % self.space.dim();
        let diff = query[axis] - self.space.point(node as usize)[axis];
        let (near, far) = if diff <= 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(near.0, near.1, depth + 1, query, exclude, best);
        // The far half can only matter if the splitting plane is closer
        // than the current worst candidate (ties still must be visited:
        // an equal distance with a lower index wins).
        if diff * diff <= best.worst_dist2() {
            self.search(far.0, far.1, depth + 1, query, exclude, best);
        }
    }
}

fn build_subtree(space: &EmbeddedSpace, slice: &mut [u32], depth: usize) {
    if slice.len() <= 1 {
        return;
    }
    let axis = depth % space.dim();
    let mid = slice.len() / 2;
    slice.select_nth_unstable_by(mid, |&a, &b| {
        space.point(a as usize)[axis]
            .total_cmp(&space.point(b as usize)[axis])
            .then(a.cmp(&b))
    });
    let (left, rest) = slice.split_at_mut(mid);
    build_subtree(space, left, depth + 1);
    build_subtree(space, &mut rest[1..], depth + 1);
}

pub(super) fn dist2(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
