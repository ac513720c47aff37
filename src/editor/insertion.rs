use crate::curve::AnchorStore;
use crate::math::distance_3d::point_to_polyline_dist_sq;
use crate::math::Point3;
use crate::surface::Surface;

/// Finds the curve segment a surface click lands on.
///
/// Every segment path (the closing one included when the curve is closed)
/// is measured against `hit`. If the closest lies within
/// `sqrt(threshold_sq)`, its starting anchor position is returned, meaning
/// "insert after this anchor"; otherwise `None`, meaning "append".
pub fn resolve_insertion_index(
    store: &mut AnchorStore,
    surface: &dyn Surface,
    hit: &Point3,
    threshold_sq: f64,
) -> Option<usize> {
    let n = store.len();
    let mut best: Option<(usize, f64)> = None;
    for i in 0..store.segment_count() {
        let path = store.segment(surface, i, (i + 1) % n);
        let Some(d2) = point_to_polyline_dist_sq(hit, &path) else {
            continue;
        };
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.filter(|&(_, d2)| d2 < threshold_sq).map(|(i, _)| i)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::PathParams;
    use crate::surface::TriangleSurface;

    /// Corners of an 11 × 11 grid, counter-clockwise from the origin.
    fn square(closed: bool) -> AnchorStore {
        let mut store = AnchorStore::new(PathParams::default());
        for v in [0, 10, 120, 110] {
            store.add(v, None);
        }
        store.set_closed(closed);
        store
    }

    #[test]
    fn click_on_segment_inserts_after_its_start() {
        let surface = TriangleSurface::grid(11, 11, 1.0).unwrap();
        let mut store = square(false);
        let at = resolve_insertion_index(&mut store, &surface, &Point3::new(10.0, 4.0, 0.0), 0.04);
        assert_eq!(at, Some(1));
    }

    #[test]
    fn click_away_from_curve_appends() {
        let surface = TriangleSurface::grid(11, 11, 1.0).unwrap();
        let mut store = square(false);
        let at = resolve_insertion_index(&mut store, &surface, &Point3::new(5.0, 5.0, 0.0), 0.04);
        assert_eq!(at, None);
    }

    #[test]
    fn closing_segment_counts_only_when_closed() {
        let surface = TriangleSurface::grid(11, 11, 1.0).unwrap();
        let hit = Point3::new(0.0, 6.0, 0.0);

        let mut open = square(false);
        assert_eq!(resolve_insertion_index(&mut open, &surface, &hit, 0.04), None);

        let mut closed = square(true);
        assert_eq!(resolve_insertion_index(&mut closed, &surface, &hit, 0.04), Some(3));
    }

    #[test]
    fn single_anchor_has_no_segments() {
        let surface = TriangleSurface::grid(5, 5, 1.0).unwrap();
        let mut store = AnchorStore::new(PathParams::default());
        store.add(0, None);
        let hit = Point3::new(0.0, 0.0, 0.0);
        assert_eq!(resolve_insertion_index(&mut store, &surface, &hit, 1.0), None);
    }
}
