mod controller;

pub use controller::InteractionController;

use crate::curve::{AnchorId, HandleToken};
use crate::math::Point3;

/// A pointer position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a screen point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

/// A pointer event delivered by the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A button went down.
    Pressed {
        button: PointerButton,
        position: ScreenPoint,
    },
    /// The pointer moved, with or without a button held.
    Moved {
        position: ScreenPoint,
    },
    /// A button went up.
    Released {
        button: PointerButton,
        position: ScreenPoint,
    },
}

impl PointerEvent {
    /// Screen position of the event.
    #[must_use]
    pub fn position(&self) -> ScreenPoint {
        match *self {
            Self::Pressed { position, .. }
            | Self::Moved { position }
            | Self::Released { position, .. } => position,
        }
    }
}

/// Keys the curve tool reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Closes the loop.
    Enter,
    /// Closes the loop.
    Return,
    /// Deletes the targeted anchor.
    Delete,
    /// Deletes the targeted anchor.
    Backspace,
    /// Ignored by the curve tool.
    Escape,
    /// Any other printable key.
    Character(char),
}

/// Hit testing owned by the rendering side.
pub trait Picker {
    /// Handle under the pointer, if any.
    fn pick_handle(&self, at: ScreenPoint) -> Option<HandleToken>;

    /// Surface point under the pointer, if any.
    fn pick_surface(&self, at: ScreenPoint) -> Option<Point3>;
}

/// How a camera drag moves the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Orbit around the view target.
    Rotate,
    /// Slide the view sideways.
    Pan,
}

impl NavigationMode {
    /// Left drags rotate, the other buttons pan.
    #[must_use]
    pub fn for_button(button: PointerButton) -> Self {
        match button {
            PointerButton::Left => Self::Rotate,
            PointerButton::Middle | PointerButton::Right => Self::Pan,
        }
    }
}

/// Orbit/pan camera control, driven by pointer drags the tool ignores.
pub trait CameraNavigator {
    /// Starts a camera drag at `at`.
    fn begin(&mut self, mode: NavigationMode, at: ScreenPoint);

    /// Follows the pointer during a camera drag.
    fn update(&mut self, at: ScreenPoint);

    /// Ends the camera drag.
    fn end(&mut self);
}

/// Entries of an anchor's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    /// Delete this anchor.
    Delete(AnchorId),
    /// Connect the last anchor to the first.
    CloseLoop,
}

/// What a tool did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The tool handled the event.
    Consumed,
    /// The tool did not use the event.
    Ignored,
    /// The host should offer these actions.
    ContextMenu(Vec<ContextAction>),
}

impl Response {
    /// Returns `true` if the event should go to the next handler.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Tool-specific gesture handling, selected by the active tool.
pub trait GestureStrategy {
    /// Handles a pointer event, hit testing through `picker`.
    fn pointer(&mut self, event: &PointerEvent, picker: &dyn Picker) -> Response;

    /// Handles a key press.
    fn key(&mut self, key: Key) -> Response;
}
