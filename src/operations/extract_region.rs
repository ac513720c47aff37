use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use crate::error::{ExtractionError, Result};
use crate::math::{centroid, Point3, Vector3};
use crate::surface::Surface;

use super::{ExtractionParams, RegionExtraction, RegionPatch};

/// Cross products shorter than this do not define a loop normal.
const NORMAL_EPSILON: f64 = 1e-6;

/// Cuts the region enclosed by a closed boundary path out of a surface.
///
/// The path is snapped to a ring of barrier vertices, gaps in the ring are
/// bridged through the vertex graph, and the surface minus the barrier is
/// split into connected pieces. The piece nearest to where a ray through
/// the loop centre hits the surface is the region.
///
/// The surface is only read; the cut lives in buffers owned by the
/// operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractRegion {
    params: ExtractionParams,
}

impl ExtractRegion {
    /// Creates a new `ExtractRegion` operation.
    #[must_use]
    pub fn new(params: ExtractionParams) -> Self {
        Self { params }
    }

    /// Extracts the region bounded by `path`, a closed polyline lying on
    /// `surface`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the path is too short, its normal is
    /// degenerate, the seed ray misses the surface, the cut leaves nothing,
    /// or the region is smaller than the configured minimum.
    pub fn execute(&self, surface: &dyn Surface, path: &[Point3]) -> Result<RegionExtraction> {
        if path.len() < 3 {
            return Err(ExtractionError::PathTooShort.into());
        }
        let center = centroid(path).ok_or(ExtractionError::PathTooShort)?;
        let normal = loop_normal(path, &center).ok_or(ExtractionError::DegenerateNormal)?;

        let reach = self.params.ray_length_factor * surface.length();
        let seed = surface
            .ray_intersect(&(center + normal * reach), &(center - normal * reach))
            .ok_or(ExtractionError::NoSeedIntersection)?;
        tracing::debug!(?normal, ?seed, "loop oriented");

        let ring = self.snap_barrier(surface, path, &normal);
        let (barrier, unresolved_gaps) = self.bridge_gaps(surface, &ring);
        tracing::debug!(ring = ring.len(), barrier = barrier.len(), "barrier built");
        if unresolved_gaps > 0 {
            tracing::warn!(unresolved_gaps, "barrier left open; the cut may leak");
        }

        let mut on_barrier = vec![false; surface.vertex_count()];
        for &v in &barrier {
            if let Some(slot) = on_barrier.get_mut(v) {
                *slot = true;
            }
        }
        let kept: Vec<usize> = (0..surface.face_count())
            .filter(|&f| surface.face_vertices(f).iter().all(|&v| !on_barrier[v]))
            .collect();
        if kept.is_empty() {
            return Err(ExtractionError::EmptyCut.into());
        }

        let (labels, component_count) = label_components(surface, &kept);
        let target = nearest_component(surface, &labels, &seed).ok_or(ExtractionError::EmptyCut)?;
        tracing::debug!(component_count, target, "surface split");

        let patch = build_patch(surface, &kept, &labels, target);
        if patch.vertex_count() < self.params.min_region_points {
            return Err(ExtractionError::RegionTooSmall {
                points: patch.vertex_count(),
                min: self.params.min_region_points,
            }
            .into());
        }

        Ok(RegionExtraction {
            patch,
            seed,
            normal,
            barrier,
            unresolved_gaps,
            component_count,
        })
    }

    /// Snaps each path point to a nearby vertex facing the same way as the
    /// loop, dropping consecutive repeats.
    fn snap_barrier(&self, surface: &dyn Surface, path: &[Point3], normal: &Vector3) -> Vec<usize> {
        let k = self.params.candidate_count.max(1);
        let mut ring: Vec<usize> = Vec::with_capacity(path.len());
        for point in path {
            let candidates = surface.nearest_vertices(point, k);
            let chosen = candidates
                .iter()
                .copied()
                .find(|&v| surface.vertex_normal(v).dot(normal) > self.params.normal_tolerance)
                .or_else(|| candidates.first().copied());
            if let Some(v) = chosen {
                if ring.last() != Some(&v) {
                    ring.push(v);
                }
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }

    /// Splices shortest vertex paths between consecutive ring vertices that
    /// share no face, including the pair closing the ring.
    fn bridge_gaps(&self, surface: &dyn Surface, ring: &[usize]) -> (Vec<usize>, usize) {
        let n = ring.len();
        let pairs = if n > 2 { n } else { n.saturating_sub(1) };
        let mut barrier = Vec::with_capacity(n);
        let mut unresolved = 0;

        for (i, &a) in ring.iter().enumerate() {
            barrier.push(a);
            if i >= pairs {
                continue;
            }
            let b = ring[(i + 1) % n];
            if a == b || surface.shares_face(a, b) {
                continue;
            }
            match shortest_path(surface, a, b, self.params.max_bridge_hops) {
                Some(bridge) => {
                    tracing::trace!(from = a, to = b, hops = bridge.len() + 1, "gap bridged");
                    barrier.extend(bridge);
                }
                None => unresolved += 1,
            }
        }
        (barrier, unresolved)
    }
}

/// Unit normal of a closed loop, oriented towards +Z.
///
/// Uses the chord from the centroid to the first point crossed with the
/// chord to the point a third of the way round, moving on to later points
/// while the two are collinear. The +Z orientation assumes a roughly
/// horizontal surface; it is a heuristic, not a winding test.
fn loop_normal(path: &[Point3], center: &Point3) -> Option<Vector3> {
    let first = path.first()? - center;
    let n = path.len();
    let start = n / 3;
    (0..n)
        .map(|k| (start + k) % n)
        .find_map(|j| {
            let cross = first.cross(&(path[j] - center));
            (cross.norm() > NORMAL_EPSILON).then(|| cross.normalize())
        })
        .map(|normal| if normal.z < 0.0 { -normal } else { normal })
}

/// Breadth-first search over face-sharing vertices. Returns the vertices
/// strictly between `from` and `to`, or `None` if `to` is more than
/// `max_hops` away.
fn shortest_path(surface: &dyn Surface, from: usize, to: usize, max_hops: usize) -> Option<Vec<usize>> {
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    parent.insert(from, from);
    queue.push_back((from, 0_usize));

    while let Some((v, depth)) = queue.pop_front() {
        if v == to {
            let mut inner = Vec::with_capacity(depth.saturating_sub(1));
            let mut cur = *parent.get(&to)?;
            while cur != from {
                inner.push(cur);
                cur = *parent.get(&cur)?;
            }
            inner.reverse();
            return Some(inner);
        }
        if depth == max_hops {
            continue;
        }
        for &f in surface.incident_faces(v) {
            for w in surface.face_vertices(f) {
                if let Entry::Vacant(e) = parent.entry(w) {
                    e.insert(v);
                    queue.push_back((w, depth + 1));
                }
            }
        }
    }
    None
}

/// Labels the vertices of `kept` faces by connected component.
fn label_components(surface: &dyn Surface, kept: &[usize]) -> (Vec<Option<usize>>, usize) {
    let vertex_count = surface.vertex_count();
    let mut vertex_faces: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for &f in kept {
        for v in surface.face_vertices(f) {
            vertex_faces[v].push(f);
        }
    }

    let mut labels: Vec<Option<usize>> = vec![None; vertex_count];
    let mut count = 0;
    let mut queue = VecDeque::new();
    for &f in kept {
        let [start, _, _] = surface.face_vertices(f);
        if labels[start].is_some() {
            continue;
        }
        labels[start] = Some(count);
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            for &g in &vertex_faces[v] {
                for w in surface.face_vertices(g) {
                    if labels[w].is_none() {
                        labels[w] = Some(count);
                        queue.push_back(w);
                    }
                }
            }
        }
        count += 1;
    }
    (labels, count)
}

/// Component of the labelled vertex closest to `seed`.
fn nearest_component(surface: &dyn Surface, labels: &[Option<usize>], seed: &Point3) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(v, label)| label.map(|l| (l, (surface.vertex_position(v) - seed).norm_squared())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
}

/// Copies one component into a patch with compacted vertex indices.
fn build_patch(surface: &dyn Surface, kept: &[usize], labels: &[Option<usize>], target: usize) -> RegionPatch {
    let mut remap: Vec<Option<usize>> = vec![None; labels.len()];
    let mut patch = RegionPatch::default();
    for (v, label) in labels.iter().enumerate() {
        if *label == Some(target) {
            remap[v] = Some(patch.source_vertices.len());
            patch.source_vertices.push(v);
            patch.vertices.push(surface.vertex_position(v));
            patch.normals.push(surface.vertex_normal(v));
        }
    }
    for &f in kept {
        let [a, b, c] = surface.face_vertices(f);
        if let (Some(a), Some(b), Some(c)) = (remap[a], remap[b], remap[c]) {
            patch.faces.push([a, b, c]);
        }
    }
    patch
}
