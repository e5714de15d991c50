//! Seam precedence classification.
//!
//! Seams on the diagram outline are order 0. A seam that runs from outline
//! to outline, meeting it at exactly two distinct points, is order 1. Every
//! later seam is one order above the seam it lands on. Classification runs
//! in rounds; a seam still unordered after the round cap stays `None`.

use crate::geometry::Polygon2D;
use fpp_core::geometry::{Outline, Segment};
use fpp_core::robust::{
    point_line_distance, point_segment_distance, segment_distance, segment_intersection,
    SegmentIntersection,
};
use fpp_core::Config;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Precedence of every input segment, `None` when unclassified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeamOrder {
    orders: Vec<Option<u32>>,
}

impl SeamOrder {
    /// Wraps explicit per-segment orders.
    pub fn from_orders(orders: Vec<Option<u32>>) -> Self {
        Self { orders }
    }

    pub fn get(&self, segment: usize) -> Option<u32> {
        self.orders.get(segment).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<u32>] {
        &self.orders
    }

    /// Highest assigned order.
    pub fn max_order(&self) -> Option<u32> {
        self.orders.iter().flatten().copied().max()
    }

    /// Number of segments left without an order.
    pub fn unclassified_count(&self) -> usize {
        self.orders.iter().filter(|o| o.is_none()).count()
    }

    /// Indices of segments with exactly `order`.
    pub fn segments_of_order(&self, order: u32) -> impl Iterator<Item = usize> + '_ {
        self.orders
            .iter()
            .enumerate()
            .filter(move |(_, o)| **o == Some(order))
            .map(|(i, _)| i)
    }
}

/// Convex outline of the whole diagram (hull of every polygon vertex).
pub fn diagram_outline(polygons: &[Polygon2D]) -> Option<Polygon2D> {
    let points: Vec<(f64, f64)> = polygons.iter().flat_map(|p| p.vertices().iter().copied()).collect();
    Polygon2D::hull_of_points(&points).ok()
}

/// Assigns a seam order to every segment.
///
/// Order 0 needs both endpoints within `seam_order_tolerance` of one outline
/// edge. Two seams touch when they come within twice `snap_tolerance`, the
/// widest gap the polygon builder's grid snapping joins.
pub fn classify_seams(segments: &[Segment], outline: &Polygon2D, config: &Config) -> SeamOrder {
    let tau = config.seam_order_tolerance;
    let contact = (2.0 * config.snap_tolerance).max(f64::EPSILON);
    let mut orders: Vec<Option<u32>> = vec![None; segments.len()];

    for (i, segment) in segments.iter().enumerate() {
        let on_outline = outline.edges().any(|(a, b)| {
            point_segment_distance(segment.start, a, b) <= tau
                && point_segment_distance(segment.end, a, b) <= tau
        });
        if on_outline {
            orders[i] = Some(0);
        }
    }

    for round in 1..=config.max_seam_rounds {
        if orders.iter().all(Option::is_some) {
            break;
        }

        let previous: Vec<usize> = (0..segments.len())
            .filter(|&j| orders[j] == Some(round - 1))
            .collect();
        if previous.is_empty() {
            break;
        }

        let mut assigned = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            if orders[i].is_some() {
                continue;
            }
            let qualifies = if round == 1 {
                distinct_contacts(segment, previous.iter().map(|&j| &segments[j]), contact) == 2
            } else {
                previous.iter().any(|&j| touches(segment, &segments[j], contact))
            };
            if qualifies {
                assigned.push(i);
            }
        }

        log::trace!("seam round {round}: {} segments classified", assigned.len());
        if assigned.is_empty() {
            break;
        }
        for i in assigned {
            orders[i] = Some(round);
        }
    }

    let result = SeamOrder { orders };
    let unclassified = result.unclassified_count();
    if unclassified > 0 {
        log::warn!(
            "{unclassified} of {} seams remain unordered after {} rounds",
            result.len(),
            config.max_seam_rounds
        );
    }
    log::debug!("seam orders assigned, max order {:?}", result.max_order());
    result
}

fn touches(a: &Segment, b: &Segment, tol: f64) -> bool {
    segment_distance(a.start, a.end, b.start, b.end) <= tol
}

/// Number of distinct points at which `segment` meets any of `others`.
fn distinct_contacts<'a>(
    segment: &Segment,
    others: impl Iterator<Item = &'a Segment>,
    tol: f64,
) -> usize {
    let mut points: Vec<(f64, f64)> = Vec::new();

    for other in others {
        if !touches(segment, other, tol) {
            continue;
        }
        let point = match segment_intersection(segment.start, segment.end, other.start, other.end) {
            SegmentIntersection::Point(p) | SegmentIntersection::Overlap(p, _) => p,
            SegmentIntersection::None => {
                // Near miss within tolerance: use the closer endpoint.
                let ds = point_segment_distance(segment.start, other.start, other.end);
                let de = point_segment_distance(segment.end, other.start, other.end);
                if ds <= de {
                    segment.start
                } else {
                    segment.end
                }
            }
        };

        let seen = points
            .iter()
            .any(|q| ((q.0 - point.0).powi(2) + (q.1 - point.1).powi(2)).sqrt() <= tol);
        if !seen {
            points.push(point);
        }
    }

    points.len()
}

/// Highest order among classified segments lying along an edge of `polygon`.
///
/// A segment lies along an edge when both its endpoints are within `tolerance`
/// of the edge's line and its projection onto the edge overlaps it.
/// Returns `None` when no classified segment lies along any edge.
pub fn polygon_max_seam_order(
    polygon: &Polygon2D,
    segments: &[Segment],
    orders: &SeamOrder,
    tolerance: f64,
) -> Option<u32> {
    let bounds = polygon.bounding_box()?;

    segments
        .iter()
        .enumerate()
        .filter_map(|(i, s)| orders.get(i).map(|order| (s, order)))
        .filter(|(s, _)| {
            let sb = s.aabb();
            sb.min_x <= bounds.max_x + tolerance
                && sb.max_x >= bounds.min_x - tolerance
                && sb.min_y <= bounds.max_y + tolerance
                && sb.max_y >= bounds.min_y - tolerance
        })
        .filter(|(s, _)| polygon.edges().any(|(a, b)| lies_along(s, a, b, tolerance)))
        .map(|(_, order)| order)
        .max()
}

fn lies_along(segment: &Segment, a: (f64, f64), b: (f64, f64), tol: f64) -> bool {
    if point_line_distance(segment.start, a, b) > tol || point_line_distance(segment.end, a, b) > tol {
        return false;
    }

    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return false;
    }
    let project = |p: (f64, f64)| ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len;
    let (t0, t1) = (project(segment.start), project(segment.end));
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(len);
    hi - lo > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(a, b)
    }

    fn square_with_diagonal(s: f64) -> Vec<Segment> {
        vec![
            seg((0.0, 0.0), (s, 0.0)),
            seg((s, 0.0), (s, s)),
            seg((s, s), (0.0, s)),
            seg((0.0, s), (0.0, 0.0)),
            seg((0.0, 0.0), (s, s)),
        ]
    }

    fn outline(s: f64) -> Polygon2D {
        Polygon2D::rectangle(0.0, 0.0, s, s).unwrap()
    }

    #[test]
    fn test_border_and_diagonal() {
        let orders = classify_seams(&square_with_diagonal(100.0), &outline(100.0), &Config::default());
        assert_eq!(orders.as_slice(), &[Some(0), Some(0), Some(0), Some(0), Some(1)]);
        assert_eq!(orders.max_order(), Some(1));
        assert_eq!(orders.unclassified_count(), 0);
    }

    #[test]
    fn test_nested_orders() {
        let mut segments = square_with_diagonal(100.0);
        // Lands on the diagonal and the bottom edge.
        segments.push(seg((50.0, 50.0), (60.0, 0.0)));
        // Lands on the previous seam only.
        segments.push(seg((55.0, 25.0), (80.0, 20.0)));

        let orders = classify_seams(&segments, &outline(100.0), &Config::default());
        assert_eq!(orders.get(5), Some(2));
        assert_eq!(orders.get(6), Some(3));
        assert_eq!(orders.segments_of_order(0).count(), 4);
    }

    #[test]
    fn test_snapped_gap_still_touches() {
        let mut segments = square_with_diagonal(100.0);
        segments.push(seg((50.0, 50.0), (55.0004, 25.0004)));
        // Stops short of the previous seam's end by about 1.1e-3 diagonally;
        // both endpoints round to (55, 25) on the snap grid.
        segments.push(seg((54.9996, 24.9996), (40.0, 10.0)));

        let orders = classify_seams(&segments, &outline(100.0), &Config::default());
        assert_eq!(orders.get(5), Some(2));
        assert_eq!(orders.get(6), Some(3));
    }

    #[test]
    fn test_round_cap_leaves_unclassified() {
        let mut segments = square_with_diagonal(100.0);
        segments.push(seg((50.0, 50.0), (60.0, 0.0)));
        let config = Config::default().with_max_seam_rounds(1);

        let orders = classify_seams(&segments, &outline(100.0), &config);
        assert_eq!(orders.get(4), Some(1));
        assert_eq!(orders.get(5), None);
        assert_eq!(orders.unclassified_count(), 1);
    }

    #[test]
    fn test_floating_segment_stays_unclassified() {
        let mut segments = square_with_diagonal(100.0);
        segments.push(seg((70.0, 20.0), (90.0, 22.0)));
        let orders = classify_seams(&segments, &outline(100.0), &Config::default());
        assert_eq!(orders.get(5), None);
    }

    #[test]
    fn test_polygon_max_seam_order() {
        let segments = square_with_diagonal(100.0);
        let orders = SeamOrder::from_orders(vec![Some(0), Some(0), Some(0), Some(0), Some(1)]);
        let lower = Polygon2D::new(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]).unwrap();
        assert_eq!(polygon_max_seam_order(&lower, &segments, &orders, 10.0), Some(1));

        let unordered = SeamOrder::from_orders(vec![None; 5]);
        assert_eq!(polygon_max_seam_order(&lower, &segments, &unordered, 10.0), None);
    }

    #[test]
    fn test_collinear_but_disjoint_segment_ignored() {
        let segments = vec![seg((200.0, 0.0), (300.0, 0.0))];
        let orders = SeamOrder::from_orders(vec![Some(4)]);
        let poly = outline(100.0);
        assert_eq!(polygon_max_seam_order(&poly, &segments, &orders, 10.0), None);
    }

    #[test]
    fn test_diagram_outline() {
        let polys = vec![
            Polygon2D::rectangle(0.0, 0.0, 1.0, 1.0).unwrap(),
            Polygon2D::rectangle(1.0, 0.0, 1.0, 1.0).unwrap(),
        ];
        let hull = diagram_outline(&polys).unwrap();
        assert_eq!(hull.len(), 4);
        assert!((hull.area() - 2.0).abs() < 1e-12);
        assert!(diagram_outline(&[]).is_none());
    }
}
