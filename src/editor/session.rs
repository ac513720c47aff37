use std::fmt;
use std::rc::Rc;

use crate::curve::{AnchorId, AnchorStore, Insertion, PathParams};
use crate::math::Point3;
use crate::surface::Surface;

use super::{HandleProvider, HandleStyle};

/// The state curve commands operate on: the target surface, the anchor
/// store and the visual handles mirroring it.
///
/// Every mutation keeps the handles in step with the store and reports the
/// new curve to the handle provider.
pub struct CurveSession {
    surface: Option<Rc<dyn Surface>>,
    store: AnchorStore,
    handles: Box<dyn HandleProvider>,
    active: Option<AnchorId>,
}

impl fmt::Debug for CurveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveSession")
            .field("has_surface", &self.surface.is_some())
            .field("store", &self.store)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl CurveSession {
    pub(crate) fn new(params: PathParams, handles: Box<dyn HandleProvider>) -> Self {
        Self {
            surface: None,
            store: AnchorStore::new(params),
            handles,
            active: None,
        }
    }

    /// The surface anchors are snapped to.
    #[must_use]
    pub fn surface(&self) -> Option<&Rc<dyn Surface>> {
        self.surface.as_ref()
    }

    /// The anchor store.
    #[must_use]
    pub fn store(&self) -> &AnchorStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut AnchorStore {
        &mut self.store
    }

    pub(crate) fn handles_mut(&mut self) -> &mut dyn HandleProvider {
        self.handles.as_mut()
    }

    pub(crate) fn set_surface(&mut self, surface: Rc<dyn Surface>) {
        self.surface = Some(surface);
        self.store.invalidate_paths();
        for &id in self.store.ids() {
            let Some(anchor) = self.store.anchor(id) else {
                continue;
            };
            if let (Some(token), Some(surface)) = (anchor.handle, self.surface.as_ref()) {
                self.handles
                    .set_handle_position(token, &surface.vertex_position(anchor.vertex));
            }
        }
        self.refresh();
    }

    pub(crate) fn set_active(&mut self, active: Option<AnchorId>) {
        self.active = active;
        self.refresh_styles();
    }

    /// Snaps `point` to the nearest surface vertex and adds an anchor there.
    ///
    /// Returns `None` when there is no surface to snap to.
    pub(crate) fn insert_anchor(
        &mut self,
        point: &Point3,
        insert_after: Option<usize>,
    ) -> Option<(Insertion, usize)> {
        let surface = self.surface.clone()?;
        let vertex = surface.nearest_vertex(point)?;
        let insertion = self.store.add(vertex, insert_after);
        if let Insertion::Inserted(id) = insertion {
            let token = self.handles.create_handle(&surface.vertex_position(vertex));
            self.store.set_handle(id, Some(token));
            self.refresh();
        }
        Some((insertion, vertex))
    }

    /// Takes an anchor out of the curve and destroys its handle.
    pub(crate) fn detach_anchor(&mut self, id: AnchorId) -> Option<(usize, usize)> {
        let removed = self.store.remove(id)?;
        self.drop_handle(id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.refresh();
        Some(removed)
    }

    /// Puts a detached anchor back and gives it a fresh handle.
    pub(crate) fn reattach_anchor(
        &mut self,
        id: AnchorId,
        vertex: usize,
        index: usize,
        was_closed: bool,
    ) -> bool {
        if !self.store.restore(id, vertex, index, was_closed) {
            return false;
        }
        self.ensure_handle(id);
        self.refresh();
        true
    }

    /// Re-snaps an anchor and moves its handle.
    pub(crate) fn relocate_anchor(&mut self, id: AnchorId, vertex: usize) -> bool {
        if !self.store.move_anchor(id, vertex) {
            return false;
        }
        let token = self.store.anchor(id).and_then(|a| a.handle);
        if let (Some(token), Some(surface)) = (token, self.surface.as_ref()) {
            self.handles
                .set_handle_position(token, &surface.vertex_position(vertex));
        }
        self.refresh();
        true
    }

    pub(crate) fn set_closed(&mut self, closed: bool) -> bool {
        if !self.store.set_closed(closed) {
            return false;
        }
        self.refresh();
        true
    }

    /// Empties the curve and returns the anchors it held, in order.
    ///
    /// With `keep_handles` the anchors keep their handle tokens so a later
    /// [`restore_full_state`](Self::restore_full_state) reuses them;
    /// otherwise the handles are destroyed.
    pub(crate) fn hard_reset(&mut self, keep_handles: bool) -> Vec<AnchorId> {
        let ids = self.store.clear_sequence();
        if !keep_handles {
            for &id in &ids {
                self.drop_handle(id);
            }
        }
        self.active = None;
        self.refresh();
        ids
    }

    /// Replaces the curve with `ids` and the closed flag.
    pub(crate) fn restore_full_state(&mut self, ids: &[AnchorId], closed: bool) {
        let previous = self.hard_reset(true);
        for id in previous {
            if !ids.contains(&id) {
                self.drop_handle(id);
            }
        }
        self.store.restore_sequence(ids, closed);
        for &id in ids {
            self.ensure_handle(id);
        }
        self.refresh();
    }

    /// Destroys every handle and forgets every anchor.
    pub(crate) fn purge(&mut self) {
        let ids: Vec<AnchorId> = self.store.ids().to_vec();
        for id in ids {
            self.drop_handle(id);
        }
        self.store.purge();
        self.active = None;
        self.refresh();
    }

    /// The whole interpolated curve; empty without a surface.
    pub fn full_path(&mut self) -> Vec<Point3> {
        match self.surface.clone() {
            Some(surface) => self.store.full_path(surface.as_ref()),
            None => Vec::new(),
        }
    }

    fn drop_handle(&mut self, id: AnchorId) {
        if let Some(token) = self.store.anchor(id).and_then(|a| a.handle) {
            self.handles.destroy_handle(token);
            self.store.set_handle(id, None);
        }
    }

    fn ensure_handle(&mut self, id: AnchorId) {
        let (Some(anchor), Some(surface)) = (self.store.anchor(id), self.surface.as_ref()) else {
            return;
        };
        let position = surface.vertex_position(anchor.vertex);
        let handle = anchor.handle;
        match handle {
            Some(token) => self.handles.set_handle_position(token, &position),
            None => {
                let token = self.handles.create_handle(&position);
                self.store.set_handle(id, Some(token));
            }
        }
    }

    fn refresh(&mut self) {
        let path = self.full_path();
        let closed = self.store.is_closed();
        self.handles.curve_changed(&path, closed);
        self.refresh_styles();
    }

    fn refresh_styles(&mut self) {
        let open_end = if self.store.is_closed() {
            None
        } else {
            self.store.last()
        };
        for &id in self.store.ids() {
            let Some(token) = self.store.anchor(id).and_then(|a| a.handle) else {
                continue;
            };
            let style = if self.active == Some(id) {
                HandleStyle::Active
            } else if open_end == Some(id) {
                HandleStyle::OpenEnd
            } else {
                HandleStyle::Normal
            };
            self.handles.set_handle_style(token, style);
        }
    }
}
