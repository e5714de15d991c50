//! Robust geometric predicates for numerical stability.
//!
//! Orientation tests go through Shewchuk's adaptive precision arithmetic
//! (the `robust` crate), so nearly-collinear seam endpoints are classified
//! consistently. Distance helpers are plain floating point and are always
//! compared against an explicit tolerance by the caller.
//!
//! ## Example
//!
//! ```rust
//! use fpp_core::robust::{orient2d, segments_intersect, Orientation};
//!
//! assert_eq!(orient2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)), Orientation::CounterClockwise);
//! assert!(segments_intersect((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)));
//! ```

use robust::{orient2d as robust_orient2d, Coord};

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Points are arranged counter-clockwise (left turn).
    CounterClockwise,
    /// Points are arranged clockwise (right turn).
    Clockwise,
    /// Points are collinear (on the same line).
    Collinear,
}

impl Orientation {
    /// Returns true if the orientation is counter-clockwise.
    #[inline]
    pub fn is_ccw(self) -> bool {
        matches!(self, Orientation::CounterClockwise)
    }

    /// Returns true if the orientation is clockwise.
    #[inline]
    pub fn is_cw(self) -> bool {
        matches!(self, Orientation::Clockwise)
    }

    /// Returns true if the points are collinear.
    #[inline]
    pub fn is_collinear(self) -> bool {
        matches!(self, Orientation::Collinear)
    }
}

// ============================================================================
// Orientation
// ============================================================================

/// Determines the orientation of `pc` relative to the directed line `pa -> pb`.
#[inline]
pub fn orient2d(pa: (f64, f64), pb: (f64, f64), pc: (f64, f64)) -> Orientation {
    let result = orient2d_raw(pa, pb, pc);

    if result > 0.0 {
        Orientation::CounterClockwise
    } else if result < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Returns the raw orientation determinant (twice the signed triangle area).
#[inline]
pub fn orient2d_raw(pa: (f64, f64), pb: (f64, f64), pc: (f64, f64)) -> f64 {
    robust_orient2d(
        Coord { x: pa.0, y: pa.1 },
        Coord { x: pb.0, y: pb.1 },
        Coord { x: pc.0, y: pc.1 },
    )
}

// ============================================================================
// Polygon Predicates
// ============================================================================

/// Checks if a polygon is convex using robust orientation tests.
///
/// Collinear vertex triples are skipped, so a square with a midpoint on
/// one side still counts as convex.
pub fn is_convex_robust(polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut expected_orientation: Option<Orientation> = None;

    for i in 0..n {
        let o = orient2d(polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        if o.is_collinear() {
            continue;
        }

        match expected_orientation {
            None => expected_orientation = Some(o),
            Some(expected) if expected != o => return false,
            _ => {}
        }
    }

    expected_orientation.is_some()
}

/// Signed shoelace area with Kahan summation.
///
/// Positive for counter-clockwise rings, negative for clockwise.
pub fn signed_area_robust(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut c = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        let term = polygon[i].0 * polygon[j].1 - polygon[j].0 * polygon[i].1;

        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum / 2.0
}

// ============================================================================
// Segment Predicates
// ============================================================================

/// Outcome of intersecting two closed segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments are disjoint.
    None,
    /// The segments meet in exactly one point.
    Point((f64, f64)),
    /// The segments are collinear and overlap along a sub-segment.
    Overlap((f64, f64), (f64, f64)),
}

/// Returns true if the closed segments `a1-a2` and `b1-b2` share any point.
pub fn segments_intersect(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
    !matches!(
        segment_intersection(a1, a2, b1, b2),
        SegmentIntersection::None
    )
}

/// Computes the intersection of the closed segments `a1-a2` and `b1-b2`.
pub fn segment_intersection(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> SegmentIntersection {
    let o1 = orient2d(a1, a2, b1);
    let o2 = orient2d(a1, a2, b2);
    let o3 = orient2d(b1, b2, a1);
    let o4 = orient2d(b1, b2, a2);

    if o1.is_collinear() && o2.is_collinear() {
        return collinear_overlap(a1, a2, b1, b2);
    }

    let straddles_a = o1 != o2 || o1.is_collinear() || o2.is_collinear();
    let straddles_b = o3 != o4 || o3.is_collinear() || o4.is_collinear();
    if !(straddles_a && straddles_b) {
        return SegmentIntersection::None;
    }

    // Touching endpoints are returned exactly.
    if o1.is_collinear() {
        return on_segment(a1, a2, b1).map_or(SegmentIntersection::None, SegmentIntersection::Point);
    }
    if o2.is_collinear() {
        return on_segment(a1, a2, b2).map_or(SegmentIntersection::None, SegmentIntersection::Point);
    }
    if o3.is_collinear() {
        return on_segment(b1, b2, a1).map_or(SegmentIntersection::None, SegmentIntersection::Point);
    }
    if o4.is_collinear() {
        return on_segment(b1, b2, a2).map_or(SegmentIntersection::None, SegmentIntersection::Point);
    }

    let d1 = orient2d_raw(b1, b2, a1);
    let d2 = orient2d_raw(b1, b2, a2);
    let t = d1 / (d1 - d2);
    SegmentIntersection::Point((a1.0 + t * (a2.0 - a1.0), a1.1 + t * (a2.1 - a1.1)))
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> Option<(f64, f64)> {
    let within = p.0 >= a.0.min(b.0)
        && p.0 <= a.0.max(b.0)
        && p.1 >= a.1.min(b.1)
        && p.1 <= a.1.max(b.1);
    within.then_some(p)
}

fn collinear_overlap(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> SegmentIntersection {
    let dir = (a2.0 - a1.0, a2.1 - a1.1);
    let len_sq = dir.0 * dir.0 + dir.1 * dir.1;
    if len_sq == 0.0 {
        return on_segment(b1, b2, a1).map_or(SegmentIntersection::None, SegmentIntersection::Point);
    }

    let param = |p: (f64, f64)| ((p.0 - a1.0) * dir.0 + (p.1 - a1.1) * dir.1) / len_sq;
    let (tb1, tb2) = (param(b1), param(b2));
    let lo = tb1.min(tb2).max(0.0);
    let hi = tb1.max(tb2).min(1.0);

    if lo > hi {
        return SegmentIntersection::None;
    }

    let at = |t: f64| (a1.0 + t * dir.0, a1.1 + t * dir.1);
    if lo == hi {
        SegmentIntersection::Point(at(lo))
    } else {
        SegmentIntersection::Overlap(at(lo), at(hi))
    }
}

// ============================================================================
// Distances
// ============================================================================

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to point distance when `a == b`.
pub fn point_line_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    if len == 0.0 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }
    orient2d_raw(a, b, p).abs() / len
}

/// Euclidean distance from `p` to the closed segment `a-b`.
pub fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = a.0 + t * dx;
    let cy = a.1 + t * dy;
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Minimum distance between two closed segments (zero if they intersect).
pub fn segment_distance(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

// ============================================================================
// Grid Snapping
// ============================================================================

/// Snaps a point to the nearest intersection of a grid of the given resolution.
#[inline]
pub fn snap_to_grid(point: (f64, f64), resolution: f64) -> (f64, f64) {
    if resolution <= 0.0 {
        return point;
    }
    (
        (point.0 / resolution).round() * resolution,
        (point.1 / resolution).round() * resolution,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orient2d_basic() {
        let a = (0.0, 0.0);
        let b = (1.0, 0.0);
        assert_eq!(orient2d(a, b, (0.5, 1.0)), Orientation::CounterClockwise);
        assert_eq!(orient2d(a, b, (0.5, -1.0)), Orientation::Clockwise);
        assert_eq!(orient2d(a, b, (2.0, 0.0)), Orientation::Collinear);
    }

    #[test]
    fn test_orient2d_near_collinear() {
        let a = (0.0, 0.0);
        let b = (1e10, 1e10);
        let c = (1e10 + 1.0, 1e10 + 1.0);
        assert!(orient2d(a, b, c).is_collinear());
    }

    #[test]
    fn test_is_convex_robust() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(is_convex_robust(&square));

        let with_midpoint = [(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(is_convex_robust(&with_midpoint));

        let l_shape = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ];
        assert!(!is_convex_robust(&l_shape));

        let flat = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        assert!(!is_convex_robust(&flat));
    }

    #[test]
    fn test_signed_area_robust() {
        let ccw = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert_relative_eq!(signed_area_robust(&ccw), 100.0);

        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area_robust(&cw), -100.0);
    }

    #[test]
    fn test_segment_intersection_crossing() {
        match segment_intersection((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)) {
            SegmentIntersection::Point(p) => {
                assert_relative_eq!(p.0, 1.0);
                assert_relative_eq!(p.1, 1.0);
            }
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_intersection_touching_endpoint() {
        let hit = segment_intersection((0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 5.0));
        assert_eq!(hit, SegmentIntersection::Point((1.0, 0.0)));
    }

    #[test]
    fn test_segment_intersection_collinear() {
        let overlap = segment_intersection((0.0, 0.0), (4.0, 0.0), (2.0, 0.0), (6.0, 0.0));
        assert_eq!(overlap, SegmentIntersection::Overlap((2.0, 0.0), (4.0, 0.0)));

        let touch = segment_intersection((0.0, 0.0), (2.0, 0.0), (2.0, 0.0), (3.0, 0.0));
        assert_eq!(touch, SegmentIntersection::Point((2.0, 0.0)));

        let apart = segment_intersection((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0));
        assert_eq!(apart, SegmentIntersection::None);
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(!segments_intersect((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)));
    }

    #[test]
    fn test_distances() {
        assert_relative_eq!(point_line_distance((5.0, 3.0), (0.0, 0.0), (1.0, 0.0)), 3.0);
        assert_relative_eq!(point_segment_distance((5.0, 3.0), (0.0, 0.0), (1.0, 0.0)), 5.0);
        assert_relative_eq!(
            segment_distance((0.0, 0.0), (1.0, 0.0), (0.0, 2.0), (1.0, 2.0)),
            2.0
        );
        assert_relative_eq!(
            segment_distance((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)),
            0.0
        );
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid((1.23, 4.56), 0.5), (1.0, 4.5));
        assert_eq!(snap_to_grid((1.23, 4.56), 1.0), (1.0, 5.0));
        assert_eq!(snap_to_grid((1.23, 4.56), 0.0), (1.23, 4.56));
    }
}
