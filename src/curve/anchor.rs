slotmap::new_key_type! {
    /// Unique identifier for an anchor in the anchor store.
    pub struct AnchorId;
}

/// Opaque identity of a visual handle, issued by the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleToken(pub u64);

/// Data associated with a curve anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorData {
    /// Surface vertex the anchor is snapped to.
    pub vertex: usize,
    /// Visual handle, present while the anchor is part of the curve.
    pub handle: Option<HandleToken>,
}

impl AnchorData {
    /// Creates an anchor on `vertex` with no handle yet.
    #[must_use]
    pub fn new(vertex: usize) -> Self {
        Self {
            vertex,
            handle: None,
        }
    }
}

/// Outcome of adding an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new anchor was placed in the curve.
    Inserted(AnchorId),
    /// The vertex repeated its neighbour; the existing anchor is returned.
    Existing(AnchorId),
}

impl Insertion {
    /// The anchor the operation resolved to.
    #[must_use]
    pub fn id(self) -> AnchorId {
        match self {
            Self::Inserted(id) | Self::Existing(id) => id,
        }
    }

    /// Returns `true` if a new anchor was created.
    #[must_use]
    pub fn is_new(self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}
