//! Polygon reconstruction from an unordered segment soup.
//!
//! The builder runs in four passes:
//!
//! 1. **Snap**: every endpoint is rounded to a grid of `snap_tolerance`, which
//!    closes hairline gaps left by the importer.
//! 2. **Node**: segments are split at every mutual intersection so the
//!    result is a planar graph with shared vertices.
//! 3. **Trace**: dangling and bridge edges are removed, then each half-edge
//!    is followed around its left-hand face. Bounded faces come out
//!    counter-clockwise.
//! 4. **Clean**: rings are normalized, reduced for collinear vertices, and
//!    filtered by vertex count and `min_area`.

use crate::geometry::Polygon2D;
use crate::spatial_index::SpatialIndex2D;
use fpp_core::robust::{segment_intersection, signed_area_robust, snap_to_grid, SegmentIntersection};
use fpp_core::{Config, Segment};
use std::collections::{BTreeSet, HashMap};

/// Builds closed polygons from a segment set.
///
/// Returns an empty list when the segments enclose no face. Output order
/// follows the first appearance of each face's boundary in the input.
pub fn build_polygons(segments: &[Segment], config: &Config) -> Vec<Polygon2D> {
    let graph = PlanarGraph::from_segments(segments, config.snap_tolerance);
    log::debug!(
        "planar graph: {} vertices, {} edges from {} segments",
        graph.vertices.len(),
        graph.edges.len(),
        segments.len()
    );

    let mut polygons = Vec::new();
    for ring in graph.bounded_faces() {
        let Ok(polygon) = Polygon2D::new(ring) else {
            continue;
        };
        let polygon = polygon.remove_collinear_points(config.collinear_tolerance);
        if polygon.len() < 3 || polygon.area() < config.min_area {
            log::trace!("dropping face with {} vertices, area {:.4}", polygon.len(), polygon.area());
            continue;
        }
        polygons.push(polygon);
    }

    if polygons.is_empty() {
        log::warn!("no enclosed faces found in {} segments", segments.len());
    } else {
        log::debug!("built {} polygons", polygons.len());
    }
    polygons
}

/// Planar straight-line graph with snapped, shared vertices.
#[derive(Debug, Default)]
struct PlanarGraph {
    vertices: Vec<(f64, f64)>,
    edges: BTreeSet<(usize, usize)>,
    lookup: HashMap<(i64, i64), usize>,
    resolution: f64,
}

impl PlanarGraph {
    fn from_segments(segments: &[Segment], resolution: f64) -> Self {
        let mut graph = PlanarGraph {
            resolution,
            ..Default::default()
        };

        let snapped: Vec<Segment> = segments
            .iter()
            .filter(|s| s.is_finite())
            .map(|s| Segment::new(snap_to_grid(s.start, resolution), snap_to_grid(s.end, resolution)))
            .filter(|s| !s.is_degenerate())
            .collect();

        // Split parameters along each segment, endpoints included.
        let mut cuts: Vec<Vec<(f64, f64)>> = snapped.iter().map(|s| vec![s.start, s.end]).collect();

        let index = SpatialIndex2D::from_boxes(snapped.iter().map(Segment::aabb));
        for (i, j) in index.candidate_pairs(resolution) {
            let (a, b) = (&snapped[i], &snapped[j]);
            match segment_intersection(a.start, a.end, b.start, b.end) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(p) => {
                    cuts[i].push(p);
                    cuts[j].push(p);
                }
                SegmentIntersection::Overlap(p, q) => {
                    cuts[i].extend([p, q]);
                    cuts[j].extend([p, q]);
                }
            }
        }

        for (segment, mut points) in snapped.iter().zip(cuts) {
            let (sx, sy) = segment.start;
            let (dx, dy) = (segment.end.0 - sx, segment.end.1 - sy);
            points.sort_by(|p, q| {
                let tp = (p.0 - sx) * dx + (p.1 - sy) * dy;
                let tq = (q.0 - sx) * dx + (q.1 - sy) * dy;
                tp.total_cmp(&tq)
            });

            let ids: Vec<usize> = points.into_iter().map(|p| graph.vertex_id(p)).collect();
            for pair in ids.windows(2) {
                graph.add_edge(pair[0], pair[1]);
            }
        }

        graph.prune_dangling();
        graph.remove_cut_edges();
        graph
    }

    fn vertex_id(&mut self, point: (f64, f64)) -> usize {
        let snapped = snap_to_grid(point, self.resolution);
        let key = if self.resolution > 0.0 {
            (
                (snapped.0 / self.resolution).round() as i64,
                (snapped.1 / self.resolution).round() as i64,
            )
        } else {
            (snapped.0.to_bits() as i64, snapped.1.to_bits() as i64)
        };

        let next = self.vertices.len();
        let id = *self.lookup.entry(key).or_insert(next);
        if id == next {
            self.vertices.push(snapped);
        }
        id
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        if u != v {
            self.edges.insert((u.min(v), u.max(v)));
        }
    }

    /// Repeatedly removes edges ending in a degree-one vertex.
    fn prune_dangling(&mut self) {
        loop {
            let mut degree = vec![0usize; self.vertices.len()];
            for &(u, v) in &self.edges {
                degree[u] += 1;
                degree[v] += 1;
            }
            let before = self.edges.len();
            self.edges.retain(|&(u, v)| degree[u] > 1 && degree[v] > 1);
            if self.edges.len() == before {
                break;
            }
        }
    }

    /// Removes bridge edges, the edges with the same face on both sides.
    ///
    /// A bridge joining an island to its surrounding ring would otherwise be
    /// traced down and back, producing a slit ring that touches itself.
    fn remove_cut_edges(&mut self) {
        loop {
            let edges: Vec<(usize, usize)> = self.edges.iter().copied().collect();
            let (_, face_of) = self.trace_faces(&edges);
            let cuts: Vec<(usize, usize)> = edges
                .iter()
                .enumerate()
                .filter(|(k, _)| face_of[2 * k] == face_of[2 * k + 1])
                .map(|(_, &e)| e)
                .collect();
            if cuts.is_empty() {
                break;
            }

            log::trace!("removing {} cut edges", cuts.len());
            for edge in &cuts {
                self.edges.remove(edge);
            }
            self.prune_dangling();
        }
    }

    /// Follows every half-edge around its left-hand face.
    ///
    /// Returns each face as a ring of vertex ids, plus the face of every
    /// half-edge. Half-edge 2k runs u->v of the k-th edge, 2k+1 runs v->u.
    fn trace_faces(&self, edges: &[(usize, usize)]) -> (Vec<Vec<usize>>, Vec<usize>) {
        let from = |h: usize| if h % 2 == 0 { edges[h / 2].0 } else { edges[h / 2].1 };
        let to = |h: usize| if h % 2 == 0 { edges[h / 2].1 } else { edges[h / 2].0 };
        let angle = |h: usize| {
            let a = self.vertices[from(h)];
            let b = self.vertices[to(h)];
            (b.1 - a.1).atan2(b.0 - a.0)
        };

        // Outgoing half-edges per vertex, counter-clockwise by angle.
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for h in 0..edges.len() * 2 {
            outgoing[from(h)].push(h);
        }
        let mut slot = vec![0usize; edges.len() * 2];
        for list in &mut outgoing {
            list.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
            for (k, &h) in list.iter().enumerate() {
                slot[h] = k;
            }
        }

        let mut face_of = vec![usize::MAX; edges.len() * 2];
        let mut rings = Vec::new();

        for start in 0..edges.len() * 2 {
            if face_of[start] != usize::MAX {
                continue;
            }
            let face = rings.len();
            let mut ring = Vec::new();
            let mut h = start;
            while face_of[h] == usize::MAX {
                face_of[h] = face;
                ring.push(from(h));

                // Next edge is the one immediately clockwise of the twin.
                let v = to(h);
                let twin = h ^ 1;
                let list = &outgoing[v];
                let k = (slot[twin] + list.len() - 1) % list.len();
                h = list[k];
            }
            rings.push(ring);
        }

        (rings, face_of)
    }

    /// Rings of every bounded face, counter-clockwise.
    ///
    /// A face ring that passes through a vertex twice is split there; only
    /// the positively oriented loops are kept.
    fn bounded_faces(&self) -> Vec<Vec<(f64, f64)>> {
        let edges: Vec<(usize, usize)> = self.edges.iter().copied().collect();
        let (rings, _) = self.trace_faces(&edges);

        rings
            .into_iter()
            .flat_map(split_at_repeated_vertices)
            .map(|ids| ids.into_iter().map(|id| self.vertices[id]).collect::<Vec<_>>())
            .filter(|ring| ring.len() >= 3 && signed_area_robust(ring) > 0.0)
            .collect()
    }
}

/// Splits a closed vertex-id walk into simple loops at every revisited vertex.
fn split_at_repeated_vertices(walk: Vec<usize>) -> Vec<Vec<usize>> {
    let mut loops = Vec::new();
    let mut path: Vec<usize> = Vec::with_capacity(walk.len());

    for id in walk {
        if let Some(pos) = path.iter().position(|&v| v == id) {
            loops.push(path.split_off(pos));
        }
        path.push(id);
    }
    loops.push(path);
    loops
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fpp_core::robust::segments_intersect;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(a, b)
    }

    fn square_outline(s: f64) -> Vec<Segment> {
        vec![
            seg((0.0, 0.0), (s, 0.0)),
            seg((s, 0.0), (s, s)),
            seg((s, s), (0.0, s)),
            seg((0.0, s), (0.0, 0.0)),
        ]
    }

    #[test]
    fn test_single_square() {
        let polys = build_polygons(&square_outline(10.0), &Config::default());
        assert_eq!(polys.len(), 1);
        assert_relative_eq!(polys[0].area(), 100.0);
        assert_eq!(polys[0].len(), 4);
    }

    #[test]
    fn test_crossing_diagonals_make_four_triangles() {
        let mut segments = square_outline(10.0);
        segments.push(seg((0.0, 0.0), (10.0, 10.0)));
        segments.push(seg((10.0, 0.0), (0.0, 10.0)));

        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 4);
        for p in &polys {
            assert_eq!(p.len(), 3);
            assert_relative_eq!(p.area(), 25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_t_junction_splits_edge() {
        // Square split by a vertical line that ends on the top and bottom edges.
        let mut segments = square_outline(10.0);
        segments.push(seg((4.0, 0.0), (4.0, 10.0)));

        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 2);
        let mut areas: Vec<f64> = polys.iter().map(Polygon2D::area).collect();
        areas.sort_by(f64::total_cmp);
        assert_relative_eq!(areas[0], 40.0, epsilon = 1e-9);
        assert_relative_eq!(areas[1], 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_snapping_closes_small_gaps() {
        let segments = vec![
            seg((0.0, 0.0), (10.0, 0.0)),
            seg((10.0002, 0.0001), (10.0, 10.0)),
            seg((10.0, 10.0), (0.0, 10.0)),
            seg((0.0, 10.0), (0.0003, -0.0002)),
        ];
        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 1);
        assert_relative_eq!(polys[0].area(), 100.0, epsilon = 1e-2);
    }

    #[test]
    fn test_dangling_and_overlapping_segments() {
        let mut segments = square_outline(10.0);
        // Dangling tail and a duplicate, partially overlapping bottom edge.
        segments.push(seg((10.0, 10.0), (15.0, 15.0)));
        segments.push(seg((2.0, 0.0), (8.0, 0.0)));

        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
    }

    #[test]
    fn test_min_area_filter_and_empty_input() {
        let config = Config::default().with_min_area(150.0);
        assert!(build_polygons(&square_outline(10.0), &config).is_empty());
        assert!(build_polygons(&[], &Config::default()).is_empty());
        assert!(build_polygons(&[seg((0.0, 0.0), (1.0, 1.0))], &Config::default()).is_empty());
    }

    #[test]
    fn test_faces_are_ccw() {
        let mut segments = square_outline(6.0);
        segments.push(seg((3.0, 0.0), (3.0, 6.0)));
        segments.push(seg((0.0, 3.0), (6.0, 3.0)));
        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 4);
        for p in &polys {
            assert!(signed_area_robust(p.vertices()) > 0.0);
            assert_relative_eq!(p.area(), 9.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bridged_island_keeps_rings_simple() {
        let mut segments = square_outline(10.0);
        segments.push(seg((4.0, 4.0), (6.0, 4.0)));
        segments.push(seg((6.0, 4.0), (5.0, 6.0)));
        segments.push(seg((5.0, 6.0), (4.0, 4.0)));
        // Bridge from the left edge to the island.
        segments.push(seg((0.0, 5.0), (4.0, 4.0)));

        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 2);

        let mut areas: Vec<f64> = polys.iter().map(Polygon2D::area).collect();
        areas.sort_by(f64::total_cmp);
        assert_relative_eq!(areas[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(areas[1], 100.0, epsilon = 1e-9);
        for p in &polys {
            assert_simple(p);
        }
    }

    #[test]
    fn test_pinched_face_is_split() {
        // A triangle hanging off the left edge at one vertex.
        let mut segments = square_outline(10.0);
        segments.push(seg((0.0, 5.0), (3.0, 4.0)));
        segments.push(seg((3.0, 4.0), (3.0, 6.0)));
        segments.push(seg((3.0, 6.0), (0.0, 5.0)));

        let polys = build_polygons(&segments, &Config::default());
        assert_eq!(polys.len(), 2);
        let mut areas: Vec<f64> = polys.iter().map(Polygon2D::area).collect();
        areas.sort_by(f64::total_cmp);
        assert_relative_eq!(areas[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(areas[1], 100.0, epsilon = 1e-9);
        for p in &polys {
            assert_simple(p);
        }
    }

    #[test]
    fn test_split_at_repeated_vertices() {
        let loops = split_at_repeated_vertices(vec![0, 1, 2, 3, 4, 5, 3, 6]);
        assert_eq!(loops, vec![vec![3, 4, 5], vec![0, 1, 2, 3, 6]]);
        assert_eq!(split_at_repeated_vertices(vec![0, 1, 2]), vec![vec![0, 1, 2]]);
    }

    fn assert_simple(polygon: &Polygon2D) {
        let v = polygon.vertices();
        let n = v.len();
        for i in 0..n {
            for j in i + 1..n {
                assert_ne!(v[i], v[j], "vertex repeated in {v:?}");
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if !adjacent {
                    let crossing = segments_intersect(v[i], v[(i + 1) % n], v[j], v[(j + 1) % n]);
                    assert!(!crossing, "edges {i} and {j} cross in {v:?}");
                }
            }
        }
    }
}
