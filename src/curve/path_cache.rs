use std::collections::HashMap;

use crate::math::Point3;
use crate::surface::Surface;

use super::PathParams;

/// Memoized surface paths between pairs of curve anchors.
///
/// Each path is a straight line between the two anchor vertices, sampled
/// and snapped to the nearest surface vertex: a cheap stand-in for the
/// geodesic on gently curved anatomy. Entries are keyed by the sorted
/// anchor-index pair and stored in ascending index order.
#[derive(Debug, Clone, Default)]
pub struct SegmentPathCache {
    params: PathParams,
    segments: HashMap<(usize, usize), Vec<Point3>>,
}

impl SegmentPathCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(params: PathParams) -> Self {
        Self {
            params,
            segments: HashMap::new(),
        }
    }

    /// Sampling parameters.
    #[must_use]
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns the path from anchor `i` (on vertex `vertex_i`) to anchor `j`
    /// (on vertex `vertex_j`), computing and caching it on a miss.
    pub fn segment(
        &mut self,
        surface: &dyn Surface,
        (i, vertex_i): (usize, usize),
        (j, vertex_j): (usize, usize),
    ) -> Vec<Point3> {
        let (key, forward) = if i <= j { ((i, j), true) } else { ((j, i), false) };

        let path = self.segments.entry(key).or_insert_with(|| {
            let (lo, hi) = if forward {
                (vertex_i, vertex_j)
            } else {
                (vertex_j, vertex_i)
            };
            snapped_path(
                surface,
                &surface.vertex_position(lo),
                &surface.vertex_position(hi),
                &self.params,
            )
        });

        if forward {
            path.clone()
        } else {
            path.iter().rev().copied().collect()
        }
    }

    /// Returns `true` if the pair has a cached path.
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.segments.contains_key(&(i.min(j), i.max(j)))
    }

    /// Number of cached segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drops every cached segment.
    ///
    /// Any edit clears the whole cache rather than only the touched
    /// segments; recomputation is linear in curve length.
    pub fn invalidate(&mut self) {
        self.segments.clear();
    }
}

/// Number of samples on a segment of length `distance`.
#[must_use]
pub fn sample_count(distance: f64, params: &PathParams) -> usize {
    let spacing = params.sample_spacing.max(f64::EPSILON);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let by_length = (distance / spacing).round() as usize;
    by_length.max(params.min_samples).max(2)
}

/// Samples `a → b` evenly and snaps every sample to its nearest surface vertex.
#[must_use]
pub fn snapped_path(
    surface: &dyn Surface,
    a: &Point3,
    b: &Point3,
    params: &PathParams,
) -> Vec<Point3> {
    let n = sample_count((b - a).norm(), params);
    #[allow(clippy::cast_precision_loss)]
    let last = (n - 1) as f64;

    (0..n)
        .map(|k| {
            #[allow(clippy::cast_precision_loss)]
            let t = k as f64 / last;
            let sample = a + (b - a) * t;
            surface
                .nearest_vertex(&sample)
                .map_or(sample, |v| surface.vertex_position(v))
        })
        .collect()
}
