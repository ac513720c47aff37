mod anchor;
mod path_cache;
mod store;

pub use anchor::{AnchorData, AnchorId, HandleToken, Insertion};
pub use path_cache::{sample_count, snapped_path, SegmentPathCache};
pub use store::AnchorStore;

/// Parameters controlling how segment paths are sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathParams {
    /// Target distance between consecutive samples.
    pub sample_spacing: f64,
    /// Minimum number of samples per segment, endpoints included.
    pub min_samples: usize,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            sample_spacing: 0.5,
            min_samples: 10,
        }
    }
}

impl PathParams {
    /// Sets the sample spacing.
    #[must_use]
    pub fn with_sample_spacing(mut self, spacing: f64) -> Self {
        self.sample_spacing = spacing;
        self
    }

    /// Sets the minimum sample count.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }
}
