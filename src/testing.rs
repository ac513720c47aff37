//! Fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::curve::{HandleToken, PathParams};
use crate::editor::{CurveEditor, CurveSession, EditorParams, HandleProvider, HandleStyle};
use crate::interaction::{CameraNavigator, NavigationMode, Picker, ScreenPoint};
use crate::math::Point3;
use crate::operations::RegionPatch;
use crate::surface::{Surface, TriangleSurface};

pub fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// Flat `n × n` grid with unit spacing; vertex `(x, y)` is `y * n + x`.
pub fn grid(n: usize) -> Rc<dyn Surface> {
    Rc::new(TriangleSurface::grid(n, n, 1.0).unwrap())
}

/// Everything the editor asked the rendering side to do.
#[derive(Debug, Default)]
pub struct HandleLog {
    next: u64,
    pub live: BTreeMap<u64, Point3>,
    pub styles: HashMap<u64, HandleStyle>,
    pub curve_updates: usize,
    pub regions: Vec<usize>,
}

pub type SharedLog = Rc<RefCell<HandleLog>>;

struct RecordingHandles(SharedLog);

impl HandleProvider for RecordingHandles {
    fn create_handle(&mut self, position: &Point3) -> HandleToken {
        let mut log = self.0.borrow_mut();
        log.next += 1;
        let token = log.next;
        log.live.insert(token, *position);
        HandleToken(token)
    }

    fn destroy_handle(&mut self, token: HandleToken) {
        let mut log = self.0.borrow_mut();
        log.live.remove(&token.0);
        log.styles.remove(&token.0);
    }

    fn set_handle_position(&mut self, token: HandleToken, position: &Point3) {
        if let Some(slot) = self.0.borrow_mut().live.get_mut(&token.0) {
            *slot = *position;
        }
    }

    fn set_handle_highlighted(&mut self, token: HandleToken, highlighted: bool) {
        let style = if highlighted {
            HandleStyle::Active
        } else {
            HandleStyle::Normal
        };
        self.set_handle_style(token, style);
    }

    fn set_handle_style(&mut self, token: HandleToken, style: HandleStyle) {
        self.0.borrow_mut().styles.insert(token.0, style);
    }

    fn curve_changed(&mut self, _path: &[Point3], _closed: bool) {
        self.0.borrow_mut().curve_updates += 1;
    }

    fn region_extracted(&mut self, patch: &RegionPatch) {
        self.0.borrow_mut().regions.push(patch.vertex_count());
    }
}

/// A session on an `n × n` grid that records its handles.
pub fn grid_session(n: usize) -> (CurveSession, SharedLog) {
    let log = SharedLog::default();
    let mut session = CurveSession::new(
        PathParams::default(),
        Box::new(RecordingHandles(Rc::clone(&log))),
    );
    session.set_surface(grid(n));
    (session, log)
}

/// An inactive editor that records its handles.
pub fn recording_editor() -> (CurveEditor, SharedLog) {
    let log = SharedLog::default();
    let editor = CurveEditor::new(
        EditorParams::default(),
        Box::new(RecordingHandles(Rc::clone(&log))),
    );
    (editor, log)
}

/// Treats screen coordinates as positions on the 11 × 11 grid: a handle is
/// hit within a quarter unit, the surface anywhere inside the grid.
pub struct ScriptedPicker {
    handles: Option<SharedLog>,
    extent: f64,
}

impl ScriptedPicker {
    pub fn new(handles: &SharedLog) -> Self {
        Self {
            handles: Some(Rc::clone(handles)),
            extent: 10.0,
        }
    }

    pub fn empty() -> Self {
        Self {
            handles: None,
            extent: -1.0,
        }
    }
}

impl Picker for ScriptedPicker {
    fn pick_handle(&self, at: ScreenPoint) -> Option<HandleToken> {
        let log = self.handles.as_ref()?.borrow();
        let hit = log
            .live
            .iter()
            .find(|(_, pos)| (pos.x - at.x).hypot(pos.y - at.y) < 0.25)
            .map(|(&token, _)| HandleToken(token));
        hit
    }

    fn pick_surface(&self, at: ScreenPoint) -> Option<Point3> {
        let inside = |v: f64| (0.0..=self.extent).contains(&v);
        (inside(at.x) && inside(at.y)).then(|| p(at.x, at.y, 0.0))
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub events: Vec<String>,
}

impl CameraNavigator for RecordingNavigator {
    fn begin(&mut self, mode: NavigationMode, _at: ScreenPoint) {
        self.events.push(format!("begin {mode:?}"));
    }

    fn update(&mut self, _at: ScreenPoint) {
        self.events.push("update".to_owned());
    }

    fn end(&mut self) {
        self.events.push("end".to_owned());
    }
}
