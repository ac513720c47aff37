use thiserror::Error;

/// Top-level error type for the surface marking engine.
#[derive(Debug, Error)]
pub enum SurfmarkError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Errors raised while building or validating a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface has no faces")]
    EmptySurface,

    #[error("face {face} references vertex {vertex}, but the surface has {vertex_count} vertices")]
    InvalidFace {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("{attribute} has {found} entries, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Errors related to the curve tool lifecycle.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("curve tool is already active")]
    AlreadyActive,

    #[error("curve tool is not active")]
    NotActive,

    #[error("no target surface")]
    NoTargetSurface,

    #[error("surface topology changed: expected {expected} vertices, found {found}")]
    TopologyChanged { expected: usize, found: usize },
}

/// Reasons a closed curve did not yield a region.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("loop must be closed first")]
    LoopNotClosed,

    #[error("boundary path has too few points")]
    PathTooShort,

    #[error("boundary loop normal is degenerate")]
    DegenerateNormal,

    #[error("seed ray does not hit the surface")]
    NoSeedIntersection,

    #[error("cutting along the barrier left no faces")]
    EmptyCut,

    #[error("extracted region has {points} points, need at least {min}")]
    RegionTooSmall { points: usize, min: usize },
}

/// Convenience type alias for results using [`SurfmarkError`].
pub type Result<T> = std::result::Result<T, SurfmarkError>;
