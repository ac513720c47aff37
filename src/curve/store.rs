use slotmap::SlotMap;

use crate::math::Point3;
use crate::surface::Surface;

use super::{AnchorData, AnchorId, HandleToken, Insertion, PathParams, SegmentPathCache};

/// The ordered anchors of a boundary curve, its open/closed state, and the
/// cached surface paths between consecutive anchors.
///
/// Anchors live in a slot map; `order` is the curve. An anchor removed from
/// the curve keeps its slot so an undo can put the same id back, until
/// [`purge`](Self::purge) drops everything.
#[derive(Debug, Default)]
pub struct AnchorStore {
    anchors: SlotMap<AnchorId, AnchorData>,
    order: Vec<AnchorId>,
    closed: bool,
    cache: SegmentPathCache,
}

impl AnchorStore {
    /// Creates an empty, open curve.
    #[must_use]
    pub fn new(params: PathParams) -> Self {
        Self {
            anchors: SlotMap::with_key(),
            order: Vec::new(),
            closed: false,
            cache: SegmentPathCache::new(params),
        }
    }

    /// Number of anchors in the curve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the curve has no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if the last anchor connects back to the first.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Anchor ids in curve order.
    #[must_use]
    pub fn ids(&self) -> &[AnchorId] {
        &self.order
    }

    /// Snapped vertex ids in curve order.
    #[must_use]
    pub fn vertices(&self) -> Vec<usize> {
        self.order
            .iter()
            .filter_map(|&id| self.anchors.get(id).map(|a| a.vertex))
            .collect()
    }

    /// Data for an anchor, whether or not it is currently in the curve.
    #[must_use]
    pub fn anchor(&self, id: AnchorId) -> Option<&AnchorData> {
        self.anchors.get(id)
    }

    /// Position of an anchor in the curve.
    #[must_use]
    pub fn index_of(&self, id: AnchorId) -> Option<usize> {
        self.order.iter().position(|&a| a == id)
    }

    /// Returns `true` if the anchor is part of the curve.
    #[must_use]
    pub fn contains(&self, id: AnchorId) -> bool {
        self.order.contains(&id)
    }

    /// The last anchor of the curve.
    #[must_use]
    pub fn last(&self) -> Option<AnchorId> {
        self.order.last().copied()
    }

    /// Vertex of the anchor at curve position `index`.
    #[must_use]
    pub fn vertex_at(&self, index: usize) -> Option<usize> {
        self.order
            .get(index)
            .and_then(|&id| self.anchors.get(id))
            .map(|a| a.vertex)
    }

    /// The curve anchor that owns `handle`.
    #[must_use]
    pub fn find_by_handle(&self, handle: HandleToken) -> Option<AnchorId> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.anchors.get(id).is_some_and(|a| a.handle == Some(handle)))
    }

    /// The segment cache.
    #[must_use]
    pub fn cache(&self) -> &SegmentPathCache {
        &self.cache
    }

    /// Number of segments: one per consecutive pair, plus the closing one.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match self.order.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Adds an anchor on `vertex`, appending it or placing it right after
    /// curve position `insert_after`.
    ///
    /// If the vertex equals the neighbour it would be placed next to, no
    /// anchor is created and that neighbour is returned instead.
    pub fn add(&mut self, vertex: usize, insert_after: Option<usize>) -> Insertion {
        let index = match insert_after {
            Some(after) if after + 1 < self.order.len() => after + 1,
            _ => self.order.len(),
        };

        let before = index.checked_sub(1).and_then(|i| self.order.get(i).copied());
        let after = if index < self.order.len() {
            self.order.get(index).copied()
        } else if self.closed {
            // appending to a closed curve lands on the closing segment
            self.order.first().copied()
        } else {
            None
        };
        for neighbour in [before, after].into_iter().flatten() {
            if self.anchors.get(neighbour).is_some_and(|a| a.vertex == vertex) {
                return Insertion::Existing(neighbour);
            }
        }

        let id = self.anchors.insert(AnchorData::new(vertex));
        self.order.insert(index, id);
        self.cache.invalidate();
        Insertion::Inserted(id)
    }

    /// Removes an anchor from the curve, returning its former position and
    /// vertex. Missing anchors are ignored.
    ///
    /// Dropping below three anchors reopens a closed curve.
    pub fn remove(&mut self, id: AnchorId) -> Option<(usize, usize)> {
        let index = self.index_of(id)?;
        let vertex = self.anchors.get(id)?.vertex;
        self.order.remove(index);
        if self.order.len() < 3 {
            self.closed = false;
        }
        self.cache.invalidate();
        Some((index, vertex))
    }

    /// Puts a removed anchor back at `index` with its vertex and the curve's
    /// closed state as they were before removal.
    ///
    /// Returns `false` if the anchor is unknown or already in the curve.
    pub fn restore(&mut self, id: AnchorId, vertex: usize, index: usize, was_closed: bool) -> bool {
        if self.contains(id) {
            return false;
        }
        let Some(anchor) = self.anchors.get_mut(id) else {
            return false;
        };
        anchor.vertex = vertex;
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        self.closed = was_closed && self.order.len() >= 3;
        self.cache.invalidate();
        true
    }

    /// Re-snaps an anchor to another vertex.
    ///
    /// Returns `false` if the anchor is not in the curve.
    pub fn move_anchor(&mut self, id: AnchorId, vertex: usize) -> bool {
        if !self.contains(id) {
            return false;
        }
        let Some(anchor) = self.anchors.get_mut(id) else {
            return false;
        };
        anchor.vertex = vertex;
        self.cache.invalidate();
        true
    }

    /// Returns `true` if moving `id` onto `vertex` would repeat the vertex of
    /// a curve neighbour.
    #[must_use]
    pub fn would_repeat_neighbour(&self, id: AnchorId, vertex: usize) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let n = self.order.len();
        let mut neighbours = Vec::with_capacity(2);
        if index > 0 {
            neighbours.push(index - 1);
        } else if self.closed && n > 1 {
            neighbours.push(n - 1);
        }
        if index + 1 < n {
            neighbours.push(index + 1);
        } else if self.closed && n > 1 {
            neighbours.push(0);
        }
        neighbours
            .into_iter()
            .filter(|&i| i != index)
            .any(|i| self.vertex_at(i) == Some(vertex))
    }

    /// Sets the closed flag. Closing needs at least three anchors.
    ///
    /// Returns `false` (and changes nothing) when closing is refused.
    pub fn set_closed(&mut self, closed: bool) -> bool {
        if closed && self.order.len() < 3 {
            return false;
        }
        if self.closed != closed {
            self.closed = closed;
            self.cache.invalidate();
        }
        true
    }

    /// Records the visual handle of an anchor.
    pub fn set_handle(&mut self, id: AnchorId, handle: Option<HandleToken>) {
        if let Some(anchor) = self.anchors.get_mut(id) {
            anchor.handle = handle;
        }
    }

    /// Empties the curve, reopens it and clears the cache. Anchor slots are
    /// kept so the sequence can be restored; the removed ids are returned.
    pub fn clear_sequence(&mut self) -> Vec<AnchorId> {
        self.closed = false;
        self.cache.invalidate();
        std::mem::take(&mut self.order)
    }

    /// Replaces the curve with `ids` (skipping unknown ones) and the closed
    /// flag.
    pub fn restore_sequence(&mut self, ids: &[AnchorId], closed: bool) {
        self.order = ids
            .iter()
            .copied()
            .filter(|&id| self.anchors.contains_key(id))
            .collect();
        self.closed = closed && self.order.len() >= 3;
        self.cache.invalidate();
    }

    /// Drops every anchor, including those only reachable through history.
    pub fn purge(&mut self) {
        self.anchors.clear();
        self.order.clear();
        self.closed = false;
        self.cache.invalidate();
    }

    /// Clears the segment cache.
    pub fn invalidate_paths(&mut self) {
        self.cache.invalidate();
    }

    /// Surface path from curve position `i` to `j`.
    ///
    /// Returns an empty path if either position is out of range.
    pub fn segment(&mut self, surface: &dyn Surface, i: usize, j: usize) -> Vec<Point3> {
        match (self.vertex_at(i), self.vertex_at(j)) {
            (Some(vi), Some(vj)) => self.cache.segment(surface, (i, vi), (j, vj)),
            _ => Vec::new(),
        }
    }

    /// The whole curve as one polyline: consecutive segments joined without
    /// repeating their shared endpoints, including the closing segment when
    /// the curve is closed.
    pub fn full_path(&mut self, surface: &dyn Surface) -> Vec<Point3> {
        let n = self.order.len();
        let mut path: Vec<Point3> = Vec::new();
        for i in 0..self.segment_count() {
            let pts = self.segment(surface, i, (i + 1) % n);
            if path.is_empty() {
                path.extend(pts);
            } else {
                path.extend(pts.into_iter().skip(1));
            }
        }
        path
    }
}
