mod handles;
mod insertion;
mod session;

pub use handles::{HandleProvider, HandleStyle, NullHandles};
pub use insertion::resolve_insertion_index;
pub use session::CurveSession;

use std::rc::Rc;

use crate::command::{
    AddAnchor, ClearCurve, CloseLoop, Command, CommandLog, DeleteAnchor, HistoryState, MoveAnchor,
};
use crate::curve::{AnchorId, AnchorStore, PathParams};
use crate::error::{EditorError, ExtractionError, Result};
use crate::interaction::{
    ContextAction, GestureStrategy, Key, Picker, PointerButton, PointerEvent, Response,
};
use crate::math::Point3;
use crate::operations::{ExtractRegion, ExtractionParams, RegionExtraction};
use crate::surface::Surface;

/// Parameters of the curve editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorParams {
    /// Anchor handle radius as a fraction of the surface diagonal.
    pub anchor_radius_factor: f64,
    /// Clicks within this many handle radii of the curve insert into it.
    pub insertion_radius_scale: f64,
    /// Segment sampling.
    pub path: PathParams,
    /// Region extraction.
    pub extraction: ExtractionParams,
}

impl Default for EditorParams {
    fn default() -> Self {
        Self {
            anchor_radius_factor: 0.003_75,
            insertion_radius_scale: 3.5,
            path: PathParams::default(),
            extraction: ExtractionParams::default(),
        }
    }
}

impl EditorParams {
    /// Sets the handle radius as a fraction of the surface diagonal.
    #[must_use]
    pub fn with_anchor_radius_factor(mut self, factor: f64) -> Self {
        self.anchor_radius_factor = factor;
        self
    }

    /// Sets the insertion distance in handle radii.
    #[must_use]
    pub fn with_insertion_radius_scale(mut self, scale: f64) -> Self {
        self.insertion_radius_scale = scale;
        self
    }

    /// Sets segment sampling.
    #[must_use]
    pub fn with_path(mut self, path: PathParams) -> Self {
        self.path = path;
        self
    }

    /// Sets region extraction parameters.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionParams) -> Self {
        self.extraction = extraction;
        self
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// An anchor follows the pointer; `origin` is its vertex before the drag.
    DraggingAnchor { anchor: AnchorId, origin: usize },
}

/// The boundary-curve tool.
///
/// Edits go through a [`CommandLog`] so each click, drag, deletion, loop
/// closure or clear is one undoable step. Pointer and key input arrive
/// through [`GestureStrategy`]; the same operations are callable directly.
pub struct CurveEditor {
    params: EditorParams,
    session: CurveSession,
    history: CommandLog<CurveSession>,
    active: bool,
    gesture: GestureState,
    hovered: Option<AnchorId>,
    anchor_radius: f64,
}

impl std::fmt::Debug for CurveEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveEditor")
            .field("params", &self.params)
            .field("session", &self.session)
            .field("history", &self.history)
            .field("active", &self.active)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl CurveEditor {
    /// Creates an inactive editor drawing through `handles`.
    #[must_use]
    pub fn new(params: EditorParams, handles: Box<dyn HandleProvider>) -> Self {
        Self {
            params,
            session: CurveSession::new(params.path, handles),
            history: CommandLog::new(),
            active: false,
            gesture: GestureState::Idle,
            hovered: None,
            anchor_radius: 0.0,
        }
    }

    // ── lifecycle ──

    /// Activates the tool on `surface`.
    ///
    /// Starting on a different surface than last time discards the old
    /// curve and its history.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::AlreadyActive`] if the tool is running and
    /// [`EditorError::NoTargetSurface`] if the surface has no faces.
    pub fn start(&mut self, surface: Rc<dyn Surface>) -> Result<()> {
        if self.active {
            return Err(EditorError::AlreadyActive.into());
        }
        if surface.face_count() == 0 {
            return Err(EditorError::NoTargetSurface.into());
        }
        let same = self
            .session
            .surface()
            .is_some_and(|current| Rc::ptr_eq(current, &surface));
        if !same {
            self.session.purge();
            self.history.clear();
        }
        self.anchor_radius = surface.length() * self.params.anchor_radius_factor;
        self.session.set_surface(surface);
        self.active = true;
        tracing::debug!(anchors = self.store().len(), "curve tool started");
        Ok(())
    }

    /// Deactivates the tool. The curve, its history and the surface stay.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotActive`] if the tool is not running.
    pub fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Err(EditorError::NotActive.into());
        }
        self.cancel_drag();
        self.hovered = None;
        self.active = false;
        tracing::debug!("curve tool stopped");
        Ok(())
    }

    /// Returns `true` between `start` and `stop`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Swaps in a reshaped surface with the same vertices, e.g. after a
    /// sculpting stroke. Anchors keep their vertex ids.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoTargetSurface`] if no surface was set and
    /// [`EditorError::TopologyChanged`] if the vertex count differs.
    pub fn refresh_surface(&mut self, surface: Rc<dyn Surface>) -> Result<()> {
        let expected = self
            .session
            .surface()
            .map(|s| s.vertex_count())
            .ok_or(EditorError::NoTargetSurface)?;
        let found = surface.vertex_count();
        if found != expected {
            return Err(EditorError::TopologyChanged { expected, found }.into());
        }
        self.anchor_radius = surface.length() * self.params.anchor_radius_factor;
        self.session.set_surface(surface);
        Ok(())
    }

    // ── queries ──

    /// The anchor store.
    #[must_use]
    pub fn store(&self) -> &AnchorStore {
        self.session.store()
    }

    /// Anchor vertices in curve order.
    #[must_use]
    pub fn anchors(&self) -> Vec<usize> {
        self.session.store().vertices()
    }

    /// Returns `true` if the curve is a closed loop.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.store().is_closed()
    }

    /// The whole interpolated curve.
    pub fn full_path(&mut self) -> Vec<Point3> {
        self.session.full_path()
    }

    /// Handle radius on the current surface.
    #[must_use]
    pub fn anchor_radius(&self) -> f64 {
        self.anchor_radius
    }

    /// The gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// The anchor under the pointer at the last idle move.
    #[must_use]
    pub fn hovered(&self) -> Option<AnchorId> {
        self.hovered
    }

    // ── edits ──

    /// Adds an anchor at the vertex nearest to `point`: into the curve when
    /// `point` lies on it, otherwise at the end.
    ///
    /// Returns the resulting anchor; repeating the neighbouring vertex
    /// returns the existing anchor without recording history.
    pub fn add_anchor_at(&mut self, point: &Point3) -> Option<AnchorId> {
        let surface = Rc::clone(self.session.surface()?);
        let threshold = self.params.insertion_radius_scale * self.anchor_radius;
        let insert_after = resolve_insertion_index(
            self.session.store_mut(),
            surface.as_ref(),
            point,
            threshold * threshold,
        );

        let mut command = AddAnchor::new(*point, insert_after);
        command.execute(&mut self.session);
        let outcome = command.outcome()?;
        if outcome.is_new() {
            self.history.push_existing(Box::new(command));
        }
        Some(outcome.id())
    }

    /// Deletes an anchor. Returns `false` if it is not in the curve.
    pub fn delete_anchor(&mut self, id: AnchorId) -> bool {
        if !self.session.store().contains(id) {
            return false;
        }
        if matches!(self.gesture, GestureState::DraggingAnchor { anchor, .. } if anchor == id) {
            self.cancel_drag();
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.history
            .execute(Box::new(DeleteAnchor::new(id)), &mut self.session);
        true
    }

    /// Re-snaps an anchor to `vertex` as one undoable step.
    ///
    /// Declined when the anchor is not in the curve, the vertex is out of
    /// range, unchanged, or equal to a neighbouring anchor's.
    pub fn move_anchor(&mut self, id: AnchorId, vertex: usize) -> bool {
        let store = self.session.store();
        let Some(from) = store.anchor(id).filter(|_| store.contains(id)).map(|a| a.vertex) else {
            return false;
        };
        let in_range = self
            .session
            .surface()
            .is_some_and(|s| vertex < s.vertex_count());
        if !in_range || from == vertex || store.would_repeat_neighbour(id, vertex) {
            return false;
        }
        self.history
            .execute(Box::new(MoveAnchor::new(id, from, vertex)), &mut self.session);
        true
    }

    /// Connects the last anchor to the first. Declined when already closed
    /// or with fewer than three anchors.
    pub fn close_loop(&mut self) -> bool {
        let store = self.session.store();
        if store.is_closed() || store.len() < 3 {
            return false;
        }
        self.history
            .execute(Box::new(CloseLoop::new()), &mut self.session);
        true
    }

    /// Empties the curve as one undoable step. Declined when empty.
    pub fn clear_markup(&mut self) -> bool {
        if self.session.store().is_empty() {
            return false;
        }
        self.cancel_drag();
        self.hovered = None;
        self.history
            .execute(Box::new(ClearCurve::new()), &mut self.session);
        true
    }

    /// A clear command for the host to combine with its own commands and
    /// run through [`execute`](Self::execute).
    #[must_use]
    pub fn clear_markup_command(&self) -> Box<dyn Command<CurveSession>> {
        Box::new(ClearCurve::new())
    }

    /// Clears the curve immediately and drops the history.
    pub fn clear_all_markup(&mut self) {
        self.cancel_drag();
        self.hovered = None;
        self.session.purge();
        self.history.clear();
    }

    /// Runs a command against the curve and records it.
    pub fn execute(&mut self, command: Box<dyn Command<CurveSession>>) {
        self.cancel_drag();
        self.history.execute(command, &mut self.session);
    }

    /// Reverts the last edit.
    pub fn undo(&mut self) -> bool {
        self.cancel_drag();
        self.hovered = None;
        self.history.undo(&mut self.session)
    }

    /// Re-applies the last undone edit.
    pub fn redo(&mut self) -> bool {
        self.cancel_drag();
        self.hovered = None;
        self.history.redo(&mut self.session)
    }

    /// Returns `true` if there is an edit to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if there is an undone edit to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Calls `listener` whenever undo/redo availability may have changed.
    pub fn set_history_listener(&mut self, listener: impl FnMut(HistoryState) + 'static) {
        self.history.set_listener(listener);
    }

    // ── context menu ──

    /// Actions offered for an anchor: delete, plus close loop on the last
    /// anchor of an open curve with at least three anchors.
    #[must_use]
    pub fn context_actions(&self, id: AnchorId) -> Vec<ContextAction> {
        let store = self.session.store();
        if !store.contains(id) {
            return Vec::new();
        }
        let mut actions = vec![ContextAction::Delete(id)];
        if !store.is_closed() && store.len() >= 3 && store.last() == Some(id) {
            actions.push(ContextAction::CloseLoop);
        }
        actions
    }

    /// Applies a context menu choice.
    pub fn apply_context_action(&mut self, action: ContextAction) -> bool {
        match action {
            ContextAction::Delete(id) => self.delete_anchor(id),
            ContextAction::CloseLoop => self.close_loop(),
        }
    }

    // ── extraction ──

    /// Cuts the region enclosed by the closed curve out of the surface.
    ///
    /// The curve is not modified, whether or not extraction succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoTargetSurface`] without a surface,
    /// [`ExtractionError::LoopNotClosed`] for an open curve, or whatever
    /// [`ExtractRegion`] reports.
    pub fn extract_region(&mut self) -> Result<RegionExtraction> {
        let surface = self
            .session
            .surface()
            .cloned()
            .ok_or(EditorError::NoTargetSurface)?;
        if !self.session.store().is_closed() {
            return Err(ExtractionError::LoopNotClosed.into());
        }
        let path = self.session.full_path();
        let extraction =
            ExtractRegion::new(self.params.extraction).execute(surface.as_ref(), &path)?;
        tracing::debug!(
            points = extraction.patch.vertex_count(),
            "region extracted"
        );
        self.session.handles_mut().region_extracted(&extraction.patch);
        Ok(extraction)
    }

    // ── gestures ──

    fn anchor_under(&self, picker: &dyn Picker, event: &PointerEvent) -> Option<AnchorId> {
        picker
            .pick_handle(event.position())
            .and_then(|token| self.session.store().find_by_handle(token))
    }

    fn snap(&self, point: &Point3) -> Option<usize> {
        self.session.surface()?.nearest_vertex(point)
    }

    fn begin_drag(&mut self, anchor: AnchorId) {
        let Some(origin) = self.session.store().anchor(anchor).map(|a| a.vertex) else {
            return;
        };
        self.gesture = GestureState::DraggingAnchor { anchor, origin };
        self.session.set_active(Some(anchor));
    }

    /// Live drag feedback; not recorded.
    fn drag_to(&mut self, anchor: AnchorId, vertex: usize) {
        let store = self.session.store();
        let current = store.anchor(anchor).map(|a| a.vertex);
        if current != Some(vertex) && !store.would_repeat_neighbour(anchor, vertex) {
            self.session.relocate_anchor(anchor, vertex);
        }
    }

    fn finish_drag(&mut self, target: Option<usize>) {
        let GestureState::DraggingAnchor { anchor, origin } = self.gesture else {
            return;
        };
        self.gesture = GestureState::Idle;
        self.session.set_active(None);

        let current = self.session.store().anchor(anchor).map(|a| a.vertex);
        let Some(end) = target.or(current) else {
            return;
        };
        let store = self.session.store();
        if end == origin || store.would_repeat_neighbour(anchor, end) {
            self.session.relocate_anchor(anchor, origin);
            return;
        }
        self.session.relocate_anchor(anchor, end);
        self.history
            .push_existing(Box::new(MoveAnchor::new(anchor, origin, end)));
    }

    fn cancel_drag(&mut self) {
        if let GestureState::DraggingAnchor { anchor, origin } = self.gesture {
            self.gesture = GestureState::Idle;
            self.session.set_active(None);
            self.session.relocate_anchor(anchor, origin);
        }
    }

    fn key_target(&self) -> Option<AnchorId> {
        let store = self.session.store();
        let dragged = match self.gesture {
            GestureState::DraggingAnchor { anchor, .. } => Some(anchor),
            GestureState::Idle => None,
        };
        dragged
            .or(self.hovered)
            .filter(|&id| store.contains(id))
            .or_else(|| store.last())
    }
}

impl GestureStrategy for CurveEditor {
    fn pointer(&mut self, event: &PointerEvent, picker: &dyn Picker) -> Response {
        if !self.active {
            return Response::Ignored;
        }
        match *event {
            PointerEvent::Pressed {
                button: PointerButton::Left,
                position,
            } => {
                if let Some(anchor) = self.anchor_under(picker, event) {
                    self.begin_drag(anchor);
                    return Response::Consumed;
                }
                match picker.pick_surface(position) {
                    Some(hit) => {
                        self.add_anchor_at(&hit);
                        Response::Consumed
                    }
                    None => Response::Ignored,
                }
            }
            PointerEvent::Pressed {
                button: PointerButton::Right,
                ..
            } => match self.anchor_under(picker, event) {
                Some(anchor) => Response::ContextMenu(self.context_actions(anchor)),
                None => Response::Ignored,
            },
            PointerEvent::Pressed { .. } => Response::Ignored,
            PointerEvent::Moved { position } => match self.gesture {
                GestureState::DraggingAnchor { anchor, .. } => {
                    if let Some(vertex) = picker.pick_surface(position).and_then(|p| self.snap(&p)) {
                        self.drag_to(anchor, vertex);
                    }
                    Response::Consumed
                }
                GestureState::Idle => {
                    self.hovered = self.anchor_under(picker, event);
                    Response::Ignored
                }
            },
            PointerEvent::Released {
                button: PointerButton::Left,
                position,
            } if self.gesture != GestureState::Idle => {
                let target = picker.pick_surface(position).and_then(|p| self.snap(&p));
                self.finish_drag(target);
                Response::Consumed
            }
            PointerEvent::Released { .. } => Response::Ignored,
        }
    }

    fn key(&mut self, key: Key) -> Response {
        if !self.active {
            return Response::Ignored;
        }
        let handled = match key {
            Key::Enter | Key::Return => self.close_loop(),
            Key::Delete | Key::Backspace => match self.key_target() {
                Some(id) => self.delete_anchor(id),
                None => false,
            },
            Key::Escape | Key::Character(_) => false,
        };
        if handled {
            Response::Consumed
        } else {
            Response::Ignored
        }
    }
}
