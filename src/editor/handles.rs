use crate::curve::HandleToken;
use crate::math::Point3;
use crate::operations::RegionPatch;

/// Visual state of an anchor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleStyle {
    /// Resting anchor.
    #[default]
    Normal,
    /// Anchor being dragged.
    Active,
    /// Last anchor of an open curve, where the next click extends it.
    OpenEnd,
}

/// Rendering-side owner of anchor handles and curve visuals.
///
/// Tokens are opaque to the editor; it only stores them and hands them back.
pub trait HandleProvider {
    /// Creates a handle at `position`.
    fn create_handle(&mut self, position: &Point3) -> HandleToken;

    /// Destroys a handle. Unknown tokens are ignored.
    fn destroy_handle(&mut self, token: HandleToken);

    /// Moves a handle.
    fn set_handle_position(&mut self, token: HandleToken, position: &Point3);

    /// Toggles the highlighted look of a handle.
    fn set_handle_highlighted(&mut self, token: HandleToken, highlighted: bool);

    /// Applies a style; providers without distinct styles only highlight
    /// the active handle.
    fn set_handle_style(&mut self, token: HandleToken, style: HandleStyle) {
        self.set_handle_highlighted(token, style == HandleStyle::Active);
    }

    /// Called with the whole interpolated curve after every change.
    fn curve_changed(&mut self, _path: &[Point3], _closed: bool) {}

    /// Called with the patch of a successful region extraction.
    fn region_extracted(&mut self, _patch: &RegionPatch) {}
}

/// A provider that draws nothing and hands out sequential tokens.
#[derive(Debug, Default)]
pub struct NullHandles {
    next: u64,
}

impl HandleProvider for NullHandles {
    fn create_handle(&mut self, _position: &Point3) -> HandleToken {
        self.next += 1;
        HandleToken(self.next)
    }

    fn destroy_handle(&mut self, _token: HandleToken) {}

    fn set_handle_position(&mut self, _token: HandleToken, _position: &Point3) {}

    fn set_handle_highlighted(&mut self, _token: HandleToken, _highlighted: bool) {}
}
