mod kd_tree;
mod triangle_surface;

pub use kd_tree::KdTree;
pub use triangle_surface::TriangleSurface;

use crate::math::{Point3, Vector3};

/// Read-only queries the marking engine needs from a triangulated surface.
///
/// Vertex and face ids are dense indices. Implementations are assumed not
/// to change while a curve session holds them.
pub trait Surface {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangular faces.
    fn face_count(&self) -> usize;

    /// Position of a vertex.
    ///
    /// # Panics
    ///
    /// May panic if `vertex >= vertex_count()`.
    fn vertex_position(&self, vertex: usize) -> Point3;

    /// Unit normal of a vertex (zero for isolated vertices).
    ///
    /// # Panics
    ///
    /// May panic if `vertex >= vertex_count()`.
    fn vertex_normal(&self, vertex: usize) -> Vector3;

    /// Faces that contain `vertex`.
    fn incident_faces(&self, vertex: usize) -> &[usize];

    /// The three vertex ids of a face.
    ///
    /// # Panics
    ///
    /// May panic if `face >= face_count()`.
    fn face_vertices(&self, face: usize) -> [usize; 3];

    /// Vertex nearest to `point`, or `None` for an empty surface.
    fn nearest_vertex(&self, point: &Point3) -> Option<usize>;

    /// Up to `k` vertices nearest to `point`, closest first.
    fn nearest_vertices(&self, point: &Point3, k: usize) -> Vec<usize>;

    /// First surface hit on the segment `start → end`.
    fn ray_intersect(&self, start: &Point3, end: &Point3) -> Option<Point3>;

    /// Length of the bounding-box diagonal.
    fn length(&self) -> f64;

    /// Returns `true` if `a` and `b` lie on a common face.
    fn shares_face(&self, a: usize, b: usize) -> bool {
        self.incident_faces(a)
            .iter()
            .any(|&f| self.face_vertices(f).contains(&b))
    }
}
