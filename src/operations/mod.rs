mod extract_region;

pub use extract_region::ExtractRegion;

use crate::math::{Point3, Vector3};

/// Parameters for turning a closed boundary curve into a surface region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionParams {
    /// Nearest vertices considered when snapping a boundary point.
    pub candidate_count: usize,
    /// Smallest accepted dot product between a candidate's normal and the
    /// loop normal.
    pub normal_tolerance: f64,
    /// Hop limit of the search that bridges barrier gaps.
    pub max_bridge_hops: usize,
    /// Smallest accepted region, in vertices.
    pub min_region_points: usize,
    /// Half-length of the seed ray, as a multiple of the surface diagonal.
    pub ray_length_factor: f64,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            candidate_count: 5,
            normal_tolerance: -0.2,
            max_bridge_hops: 20,
            min_region_points: 10,
            ray_length_factor: 2.0,
        }
    }
}

impl ExtractionParams {
    /// Sets how many nearest vertices a barrier point considers.
    #[must_use]
    pub fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = count;
        self
    }

    /// Sets the lowest accepted normal dot product for barrier candidates.
    #[must_use]
    pub fn with_normal_tolerance(mut self, tolerance: f64) -> Self {
        self.normal_tolerance = tolerance;
        self
    }

    /// Sets the longest path allowed when bridging barrier gaps.
    #[must_use]
    pub fn with_max_bridge_hops(mut self, hops: usize) -> Self {
        self.max_bridge_hops = hops;
        self
    }

    /// Sets the smallest patch accepted as a region.
    #[must_use]
    pub fn with_min_region_points(mut self, points: usize) -> Self {
        self.min_region_points = points;
        self
    }

    /// Sets the seed ray half-length as a multiple of the surface diagonal.
    #[must_use]
    pub fn with_ray_length_factor(mut self, factor: f64) -> Self {
        self.ray_length_factor = factor;
        self
    }
}

/// A piece of surface cut out along a boundary curve.
#[derive(Debug, Clone, Default)]
pub struct RegionPatch {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals, copied from the source surface.
    pub normals: Vec<Vector3>,
    /// Triangles, indexing into `vertices`.
    pub faces: Vec<[usize; 3]>,
    /// Source surface vertex of each patch vertex.
    pub source_vertices: Vec<usize>,
}

impl RegionPatch {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Result of a successful region extraction.
#[derive(Debug, Clone)]
pub struct RegionExtraction {
    /// The selected region.
    pub patch: RegionPatch,
    /// Where the seed ray hit the surface.
    pub seed: Point3,
    /// Oriented loop normal used for the seed ray.
    pub normal: Vector3,
    /// Surface vertices removed to separate the region, in ring order.
    pub barrier: Vec<usize>,
    /// Barrier gaps the bridge search could not close.
    pub unresolved_gaps: usize,
    /// Connected pieces left after the cut.
    pub component_count: usize,
}
