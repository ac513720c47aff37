use super::{Point3, Vector3};

/// Returns the squared distance from `point` to the segment `a → b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure against the nearer endpoint.
#[must_use]
pub fn point_to_segment_dist_sq(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let closest = closest_point_on_segment(point, a, b);
    (point - closest).norm_squared()
}

/// Returns the point on segment `a → b` nearest to `point`.
#[must_use]
pub fn closest_point_on_segment(point: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let ab: Vector3 = b - a;
    let len_sq = ab.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return *a;
    }

    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Returns the squared distance from `point` to the polyline `points`,
/// or `None` when fewer than two points are given.
#[must_use]
pub fn point_to_polyline_dist_sq(point: &Point3, points: &[Point3]) -> Option<f64> {
    points
        .windows(2)
        .map(|w| point_to_segment_dist_sq(point, &w[0], &w[1]))
        .min_by(f64::total_cmp)
}
