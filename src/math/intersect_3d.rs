use super::{Point3, Vector3};

/// Slack on the barycentric bounds so rays through shared edges and
/// vertices still register a hit on one of the adjacent triangles.
const BARYCENTRIC_SLACK: f64 = 1e-9;

/// Intersection of a ray with a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit (`origin + dir * t`).
    pub t: f64,
    /// World-space hit point.
    pub point: Point3,
}

/// Intersects the ray `origin + t * dir` (`t >= 0`) with triangle `(v0, v1, v2)`
/// using the Möller–Trumbore algorithm. Both triangle sides count as hits.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3,
    dir: &Vector3,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> Option<RayHit> {
    let epsilon = 1e-12;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < epsilon {
        // Ray parallel to the triangle plane.
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(-BARYCENTRIC_SLACK..=1.0 + BARYCENTRIC_SLACK).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < -BARYCENTRIC_SLACK || u + v > 1.0 + BARYCENTRIC_SLACK {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t < 0.0 {
        return None;
    }

    Some(RayHit {
        t,
        point: origin + dir * t,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn tri() -> (Point3, Point3, Point3) {
        (p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0))
    }

    #[test]
    fn ray_hits_from_above() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(0.5, 0.5, 5.0), &Vector3::new(0.0, 0.0, -1.0), &a, &b, &c)
            .unwrap();
        assert_abs_diff_eq!(hit.t, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn back_face_counts() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(0.5, 0.5, -1.0), &Vector3::new(0.0, 0.0, 1.0), &a, &b, &c);
        assert!(hit.is_some());
    }

    #[test]
    fn ray_misses_outside() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(3.0, 3.0, 5.0), &Vector3::new(0.0, 0.0, -1.0), &a, &b, &c);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(0.5, 0.5, 5.0), &Vector3::new(0.0, 0.0, 1.0), &a, &b, &c);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_through_vertex_hits() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(0.0, 0.0, 1.0), &Vector3::new(0.0, 0.0, -1.0), &a, &b, &c);
        assert!(hit.is_some());
    }

    #[test]
    fn parallel_ray_misses() {
        let (a, b, c) = tri();
        let hit = ray_triangle_intersect(&p(0.5, 0.5, 0.0), &Vector3::new(1.0, 0.0, 0.0), &a, &b, &c);
        assert!(hit.is_none());
    }
}
