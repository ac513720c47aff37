use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::math::Point3;

/// Ranges at or below this size are scanned linearly.
const LEAF_SIZE: usize = 8;

/// A static k-d tree over a point set, answering nearest and k-nearest
/// queries by index into the original point slice.
///
/// The tree is implicit: `indices` is permuted so that every subrange is
/// split at its midpoint, and `axes[mid]` records the split axis.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    points: Vec<Point3>,
    indices: Vec<usize>,
    axes: Vec<u8>,
}

/// A candidate in the bounded max-heap; the worst candidate sits on top.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist2: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties resolve to the lower index so queries are deterministic.
        self.dist2
            .total_cmp(&other.dist2)
            .then(self.index.cmp(&other.index))
    }
}

impl KdTree {
    /// Builds a tree over `points`.
    #[must_use]
    pub fn build(points: &[Point3]) -> Self {
        let mut tree = Self {
            points: points.to_vec(),
            indices: (0..points.len()).collect(),
            axes: vec![0; points.len()],
        };
        tree.build_range(0, points.len());
        tree
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the tree indexes no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the point nearest to `query`.
    #[must_use]
    pub fn nearest(&self, query: &Point3) -> Option<usize> {
        self.nearest_k(query, 1).first().copied()
    }

    /// Indices of the `k` points nearest to `query`, closest first.
    #[must_use]
    pub fn nearest_k(&self, query: &Point3, k: usize) -> Vec<usize> {
        if k == 0 || self.points.is_empty() {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(0, self.points.len(), query, k, &mut heap);
        heap.into_sorted_vec().into_iter().map(|c| c.index).collect()
    }

    fn build_range(&mut self, start: usize, end: usize) {
        if end - start <= LEAF_SIZE {
            return;
        }

        let axis = self.choose_split_axis(start, end);
        let mid = start + (end - start) / 2;
        let points = &self.points;
        self.indices[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            points[a][axis].total_cmp(&points[b][axis])
        });
        #[allow(clippy::cast_possible_truncation)]
        {
            self.axes[mid] = axis as u8;
        }

        self.build_range(start, mid);
        self.build_range(mid + 1, end);
    }

    /// Picks the axis with the widest extent over the range.
    fn choose_split_axis(&self, start: usize, end: usize) -> usize {
        let first = self.points[self.indices[start]];
        let mut min = first;
        let mut max = first;
        for &idx in &self.indices[start + 1..end] {
            let p = self.points[idx];
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let extent = max - min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    fn search(
        &self,
        start: usize,
        end: usize,
        query: &Point3,
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if end - start <= LEAF_SIZE {
            for &idx in &self.indices[start..end] {
                self.offer(idx, query, k, heap);
            }
            return;
        }

        let mid = start + (end - start) / 2;
        let pivot = self.indices[mid];
        let axis = usize::from(self.axes[mid]);
        self.offer(pivot, query, k, heap);

        let diff = query[axis] - self.points[pivot][axis];
        let (near, far) = if diff <= 0.0 {
            ((start, mid), (mid + 1, end))
        } else {
            ((mid + 1, end), (start, mid))
        };

        self.search(near.0, near.1, query, k, heap);

        let worst = heap.peek().map_or(f64::INFINITY, |c| c.dist2);
        if heap.len() < k || diff * diff <= worst {
            self.search(far.0, far.1, query, k, heap);
        }
    }

    fn offer(&self, index: usize, query: &Point3, k: usize, heap: &mut BinaryHeap<Candidate>) {
        let candidate = Candidate {
            dist2: (self.points[index] - query).norm_squared(),
            index,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Deterministic scatter without pulling in a RNG.
    fn scatter(n: usize) -> Vec<Point3> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            #[allow(clippy::cast_precision_loss)]
            let v = (state % 10_000) as f64 / 100.0;
            v
        };
        (0..n).map(|_| p(next(), next(), next())).collect()
    }

    fn brute_force_k(points: &[Point3], q: &Point3, k: usize) -> Vec<usize> {
        let mut all: Vec<Candidate> = points
            .iter()
            .enumerate()
            .map(|(index, pt)| Candidate {
                dist2: (pt - q).norm_squared(),
                index,
            })
            .collect();
        all.sort();
        all.into_iter().take(k).map(|c| c.index).collect()
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest(&p(0.0, 0.0, 0.0)).is_none());
        assert!(tree.nearest_k(&p(0.0, 0.0, 0.0), 3).is_empty());
    }

    #[test]
    fn single_point() {
        let tree = KdTree::build(&[p(1.0, 2.0, 3.0)]);
        assert_eq!(tree.nearest(&p(100.0, 0.0, 0.0)), Some(0));
    }

    #[test]
    fn nearest_matches_brute_force() {
        let points = scatter(500);
        let tree = KdTree::build(&points);
        for q in scatter(50).iter().map(|q| q + nalgebra::Vector3::new(0.3, -0.2, 0.1)) {
            assert_eq!(tree.nearest(&q), brute_force_k(&points, &q, 1).first().copied());
        }
    }

    #[test]
    fn nearest_k_matches_brute_force_in_order() {
        let points = scatter(300);
        let tree = KdTree::build(&points);
        let q = p(50.0, 50.0, 50.0);
        assert_eq!(tree.nearest_k(&q, 5), brute_force_k(&points, &q, 5));
    }

    #[test]
    fn k_larger_than_point_count() {
        let points = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let tree = KdTree::build(&points);
        assert_eq!(tree.nearest_k(&p(1.9, 0.0, 0.0), 10), vec![2, 1, 0]);
    }

    #[test]
    fn exact_hit_is_its_own_nearest() {
        let points = scatter(200);
        let tree = KdTree::build(&points);
        for (i, pt) in points.iter().enumerate().take(20) {
            let found = tree.nearest(pt).unwrap();
            assert_eq!((points[found] - pt).norm(), 0.0, "point {i}");
        }
    }
}
