//! Minkowski sums, no-fit polygons and inner-fit polygons.
//!
//! The NFP of a stationary polygon A and an orbiting polygon B is the set of
//! translations of B at which it touches or overlaps A. It is computed as
//! `A ⊕ (-B)`:
//!
//! - **Convex case**: the edge vectors of both rings are merged by angle,
//!   O(n + m).
//! - **Non-convex case**: both rings are ear-clipped into triangles, every
//!   pair of triangles is summed with the convex routine, and the partial
//!   sums are unioned with `i_overlay`.
//!
//! The IFP is the set of translations keeping B inside a convex container,
//! obtained by shifting each container edge inward by B's support distance.

use crate::geometry::{Polygon2D, Shape};
use crate::offset::clip_half_plane;
use crate::overlay::union_polygons;
use fpp_core::transform::AABB2D;
use fpp_core::{Error, Result};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Minkowski sum `a ⊕ b`.
pub fn minkowski_sum(a: &Polygon2D, b: &Polygon2D) -> Result<Shape> {
    if a.is_convex() && b.is_convex() {
        return minkowski_sum_convex(a, b).map(Shape::Single);
    }

    let parts_a = triangulate(a);
    let parts_b = triangulate(b);

    let mut partial = Vec::with_capacity(parts_a.len() * parts_b.len());
    for pa in &parts_a {
        for pb in &parts_b {
            match minkowski_sum_convex(pa, pb) {
                Ok(sum) => partial.push(sum),
                Err(e) => log::trace!("skipping degenerate partial sum: {e}"),
            }
        }
    }

    union_polygons(&partial)
        .ok_or_else(|| Error::DegenerateGeometry("minkowski sum has no area".into()))
}

/// Minkowski sum of two convex polygons.
///
/// Both rings are walked counter-clockwise from their bottom-left vertex and
/// their edge vectors are interleaved by polar angle.
pub fn minkowski_sum_convex(a: &Polygon2D, b: &Polygon2D) -> Result<Polygon2D> {
    let va = a.vertices();
    let vb = b.vertices();

    let edges_a = edge_vectors(va);
    let edges_b = edge_vectors(vb);
    let start_a = find_bottom_left_vertex(va);
    let start_b = find_bottom_left_vertex(vb);

    let mut current = (va[start_a].0 + vb[start_b].0, va[start_a].1 + vb[start_b].1);
    let merged = merge_edge_vectors(&edges_a, start_a, &edges_b, start_b);

    let mut ring = Vec::with_capacity(merged.len() + 1);
    ring.push(current);
    for (dx, dy) in merged {
        current = (current.0 + dx, current.1 + dy);
        ring.push(current);
    }

    // The walk returns to its start; drop the near-duplicate closing vertex.
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if ring.len() > 1 && (first.0 - last.0).abs() < 1e-10 && (first.1 - last.1).abs() < 1e-10 {
            ring.pop();
        }
    }

    Polygon2D::new(ring)
}

/// Translations at which `orbiting` touches or overlaps `stationary`.
///
/// The reference point of `orbiting` is its coordinate origin.
pub fn no_fit_polygon(stationary: &Polygon2D, orbiting: &Polygon2D) -> Result<Shape> {
    minkowski_sum(stationary, &orbiting.negated())
}

/// Minkowski difference `container ⊖ piece`: every translation that keeps
/// `piece` inside `container`.
///
/// `container` must be convex. Returns `Ok(None)` when `piece` does not fit
/// or fits only at a single point or along a single line.
pub fn minkowski_difference(container: &Polygon2D, piece: &Polygon2D) -> Result<Option<Polygon2D>> {
    if !container.is_convex() {
        return Err(Error::InvalidGeometry(
            "minkowski difference needs a convex container".into(),
        ));
    }

    let cb = container.aabb();
    let pb = piece.aabb();
    let bounds = AABB2D::new(
        cb.min_x - pb.min_x,
        cb.min_y - pb.min_y,
        cb.max_x - pb.max_x,
        cb.max_y - pb.max_y,
    );
    if bounds.min_x >= bounds.max_x || bounds.min_y >= bounds.max_y {
        return Ok(None);
    }

    let mut region: Vec<(f64, f64)> = bounds.corners().to_vec();
    for (p, q) in container.edges() {
        let (dx, dy) = (q.0 - p.0, q.1 - p.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        let normal = (dy / len, -dx / len);
        let support = piece
            .vertices()
            .iter()
            .map(|v| normal.0 * v.0 + normal.1 * v.1)
            .fold(f64::NEG_INFINITY, f64::max);
        let limit = normal.0 * p.0 + normal.1 * p.1 - support;

        region = clip_half_plane(&region, normal, limit);
        if region.len() < 3 {
            return Ok(None);
        }
    }

    Ok(Polygon2D::new(region).ok())
}

/// Translations keeping `piece` inside the rectangle `area`.
pub fn inner_fit_polygon(area: &AABB2D, piece: &Polygon2D) -> Result<Option<Polygon2D>> {
    let container = Polygon2D::new(area.corners().to_vec())?;
    minkowski_difference(&container, piece)
}

/// Clips the segment `a → b` to a convex region (Cyrus–Beck).
///
/// Returns the clipped endpoints, or `None` when the overlap is empty or
/// shrinks to a point.
pub fn clip_segment_to_convex(
    a: (f64, f64),
    b: (f64, f64),
    region: &Polygon2D,
) -> Option<((f64, f64), (f64, f64))> {
    let d = (b.0 - a.0, b.1 - a.1);
    let length = (d.0 * d.0 + d.1 * d.1).sqrt();
    if length == 0.0 {
        return None;
    }

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in region.edges() {
        // Outward normal of a counter-clockwise edge.
        let normal = (q.1 - p.1, p.0 - q.0);
        let num = normal.0 * (p.0 - a.0) + normal.1 * (p.1 - a.1);
        let den = normal.0 * d.0 + normal.1 * d.1;

        if den == 0.0 {
            if num < 0.0 {
                return None;
            }
            continue;
        }
        let t = num / den;
        if den > 0.0 {
            t1 = t1.min(t);
        } else {
            t0 = t0.max(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    if (t1 - t0) * length <= 1e-9 {
        return None;
    }
    Some((
        (a.0 + t0 * d.0, a.1 + t0 * d.1),
        (a.0 + t1 * d.0, a.1 + t1 * d.1),
    ))
}

// ============================================================================
// Triangulation
// ============================================================================

/// Splits a polygon into convex parts. Convex input comes back unchanged;
/// anything else is ear-clipped into triangles.
pub fn triangulate(polygon: &Polygon2D) -> Vec<Polygon2D> {
    if polygon.is_convex() {
        return vec![polygon.clone()];
    }

    let mut vertices: Vec<(f64, f64)> = polygon.vertices().to_vec();
    let mut triangles = Vec::new();

    while vertices.len() > 3 {
        let n = vertices.len();
        let ear = (0..n).find(|&i| is_ear(&vertices, (i + n - 1) % n, i, (i + 1) % n));

        match ear {
            Some(i) => {
                let tri = vec![vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]];
                if let Ok(t) = Polygon2D::new(tri) {
                    triangles.push(t);
                }
                vertices.remove(i);
            }
            None => {
                // A collinear vertex blocks every ear; drop it and retry.
                let flat = (0..n).find(|&i| {
                    let (a, b, c) = (vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]);
                    cross(a, b, c).abs() <= 1e-12
                });
                match flat {
                    Some(i) => {
                        vertices.remove(i);
                    }
                    None => {
                        log::warn!("ear clipping failed on a {n}-gon; using its convex hull");
                        return vec![polygon.convex_hull()];
                    }
                }
            }
        }
    }

    if let Ok(t) = Polygon2D::new(vertices) {
        triangles.push(t);
    }
    triangles
}

fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0)
}

/// Checks if vertex `curr` forms an ear of the counter-clockwise ring.
fn is_ear(vertices: &[(f64, f64)], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);
    if cross(a, b, c) <= 0.0 {
        return false;
    }

    vertices
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != prev && i != curr && i != next)
        .all(|(_, &p)| !point_in_triangle(p, a, b, c))
}

/// True when `p` lies inside or on the boundary of triangle `abc` without
/// coinciding with one of its corners.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    if p == a || p == b || p == c {
        return false;
    }
    let eps = 1e-12;
    cross(a, b, p) >= -eps && cross(b, c, p) >= -eps && cross(c, a, p) >= -eps
}

// ============================================================================
// Edge-merge helpers
// ============================================================================

fn edge_vectors(ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            (ring[j].0 - ring[i].0, ring[j].1 - ring[i].1)
        })
        .collect()
}

/// Index of the bottom-most (then left-most) vertex.
fn find_bottom_left_vertex(ring: &[(f64, f64)]) -> usize {
    let mut min_idx = 0;
    for (i, &(x, y)) in ring.iter().enumerate() {
        let (min_x, min_y) = ring[min_idx];
        if y < min_y || (y == min_y && x < min_x) {
            min_idx = i;
        }
    }
    min_idx
}

/// Polar angle of an edge vector in `[0, 2π)`.
fn edge_angle(dx: f64, dy: f64) -> f64 {
    let angle = dy.atan2(dx);
    if angle < 0.0 {
        angle + 2.0 * PI
    } else {
        angle
    }
}

fn merge_edge_vectors(
    edges_a: &[(f64, f64)],
    start_a: usize,
    edges_b: &[(f64, f64)],
    start_b: usize,
) -> Vec<(f64, f64)> {
    let n_a = edges_a.len();
    let n_b = edges_b.len();

    let mut result = Vec::with_capacity(n_a + n_b);
    let mut i_a = 0;
    let mut i_b = 0;

    while i_a < n_a || i_b < n_b {
        if i_a >= n_a {
            result.push(edges_b[(start_b + i_b) % n_b]);
            i_b += 1;
        } else if i_b >= n_b {
            result.push(edges_a[(start_a + i_a) % n_a]);
            i_a += 1;
        } else {
            let ea = edges_a[(start_a + i_a) % n_a];
            let eb = edges_b[(start_b + i_b) % n_b];
            let angle_a = edge_angle(ea.0, ea.1);
            let angle_b = edge_angle(eb.0, eb.1);

            // Parallel edges are emitted together.
            if angle_a <= angle_b + 1e-10 {
                result.push(ea);
                i_a += 1;
            }
            if angle_b <= angle_a + 1e-10 {
                result.push(eb);
                i_b += 1;
            }
        }
    }

    result
}

// ============================================================================
// NFP cache
// ============================================================================

/// Identifies an NFP between two pieces at given rotations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct NfpKey {
    stationary: usize,
    stationary_millideg: i64,
    orbiting: usize,
    orbiting_millideg: i64,
}

impl NfpKey {
    pub fn new(stationary: usize, stationary_deg: f64, orbiting: usize, orbiting_deg: f64) -> Self {
        Self {
            stationary,
            stationary_millideg: (stationary_deg * 1000.0).round() as i64,
            orbiting,
            orbiting_millideg: (orbiting_deg * 1000.0).round() as i64,
        }
    }
}

/// Memo of NFPs computed with the stationary piece at the origin.
///
/// An NFP against a translated piece is the cached NFP shifted by the same
/// translation, so one entry serves every placement of that piece.
#[derive(Debug)]
pub struct NfpCache {
    cache: HashMap<NfpKey, Shape>,
    max_size: usize,
    hits: usize,
    misses: usize,
}

impl NfpCache {
    /// Creates a cache holding up to 1000 entries.
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            max_size: max_size.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached NFP for `key`, computing it on a miss.
    pub fn get_or_compute<F>(&mut self, key: NfpKey, compute: F) -> Result<Shape>
    where
        F: FnOnce() -> Result<Shape>,
    {
        if let Some(nfp) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(nfp.clone());
        }
        self.misses += 1;

        let nfp = compute()?;
        if self.cache.len() >= self.max_size {
            let evict: Vec<NfpKey> = self.cache.keys().take(self.max_size / 2 + 1).copied().collect();
            for k in evict {
                self.cache.remove(&k);
            }
        }
        self.cache.insert(key, nfp.clone());
        Ok(nfp)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for NfpCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon2D {
        Polygon2D::rectangle(x, y, w, h).unwrap()
    }

    fn l_shape() -> Polygon2D {
        Polygon2D::new(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]).unwrap()
    }

    #[test]
    fn test_edge_angle() {
        assert_relative_eq!(edge_angle(1.0, 0.0), 0.0, epsilon = 1e-10);
        assert_relative_eq!(edge_angle(0.0, 1.0), PI / 2.0, epsilon = 1e-10);
        assert_relative_eq!(edge_angle(-1.0, 0.0), PI, epsilon = 1e-10);
        assert_relative_eq!(edge_angle(0.0, -1.0), 3.0 * PI / 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_convex_sum_of_rectangles() {
        let sum = minkowski_sum_convex(&rect(0.0, 0.0, 10.0, 10.0), &rect(0.0, 0.0, 5.0, 2.0)).unwrap();
        assert_relative_eq!(sum.area(), 15.0 * 12.0, epsilon = 1e-9);
        let bb = sum.aabb();
        assert_relative_eq!(bb.max_x, 15.0);
        assert_relative_eq!(bb.max_y, 12.0);
    }

    #[test]
    fn test_convex_sum_square_and_triangle() {
        let tri = Polygon2D::new(vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]).unwrap();
        let sum = minkowski_sum_convex(&rect(0.0, 0.0, 2.0, 2.0), &tri).unwrap();
        // 4x4 box minus the top-right corner triangle of area 2.
        assert_eq!(sum.len(), 5);
        assert_relative_eq!(sum.area(), 14.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_convex_sum() {
        let sum = minkowski_sum(&l_shape(), &rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(sum.area(), 8.0, epsilon = 1e-6);
        assert_eq!(sum.parts().len(), 1);
    }

    #[test]
    fn test_triangulate() {
        let parts = triangulate(&l_shape());
        assert_eq!(parts.len(), 4);
        let total: f64 = parts.iter().map(Polygon2D::area).sum();
        assert_relative_eq!(total, 3.0, epsilon = 1e-12);

        let square = rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(triangulate(&square), vec![square]);
    }

    #[test]
    fn test_nfp_two_squares() {
        let nfp = no_fit_polygon(&rect(0.0, 0.0, 10.0, 10.0), &rect(0.0, 0.0, 5.0, 5.0))
            .unwrap()
            .into_single()
            .unwrap();
        let bb = nfp.aabb();
        assert_relative_eq!(bb.min_x, -5.0);
        assert_relative_eq!(bb.min_y, -5.0);
        assert_relative_eq!(bb.max_x, 10.0);
        assert_relative_eq!(nfp.area(), 225.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nfp_boundary_means_touching() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let b = rect(0.0, 0.0, 2.0, 2.0);
        let nfp = no_fit_polygon(&a, &b).unwrap().into_single().unwrap();
        // Every NFP vertex is a translation where b touches a without overlap.
        for &(x, y) in nfp.vertices() {
            let moved = b.translated(x, y);
            assert!(moved.intersects(&a));
            assert!(crate::overlay::intersection_area(&moved, &a) < 1e-9);
        }
    }

    #[test]
    fn test_inner_fit_rectangle() {
        let area = AABB2D::new(0.0, 0.0, 100.0, 50.0);
        let ifp = inner_fit_polygon(&area, &rect(0.0, 0.0, 10.0, 10.0)).unwrap().unwrap();
        assert_relative_eq!(ifp.area(), 90.0 * 40.0, epsilon = 1e-9);

        // A piece not anchored at the origin shifts the region.
        let ifp = inner_fit_polygon(&area, &rect(5.0, 5.0, 10.0, 10.0)).unwrap().unwrap();
        assert_relative_eq!(ifp.aabb().min_x, -5.0, epsilon = 1e-12);
        assert_relative_eq!(ifp.aabb().max_y, 35.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inner_fit_too_big_or_exact() {
        let area = AABB2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(inner_fit_polygon(&area, &rect(0.0, 0.0, 11.0, 1.0)).unwrap().is_none());
        assert!(inner_fit_polygon(&area, &rect(0.0, 0.0, 10.0, 1.0)).unwrap().is_none());
    }

    #[test]
    fn test_minkowski_difference_triangle_container() {
        let container = Polygon2D::new(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]).unwrap();
        let diff = minkowski_difference(&container, &rect(0.0, 0.0, 1.0, 1.0)).unwrap().unwrap();
        // Translations form the triangle (0,0), (8,0), (0,8).
        assert_relative_eq!(diff.area(), 32.0, epsilon = 1e-9);
        assert!(minkowski_difference(&l_shape(), &rect(0.0, 0.0, 0.1, 0.1)).is_err());
    }

    #[test]
    fn test_clip_segment_to_convex() {
        let square = rect(0.0, 0.0, 10.0, 10.0);

        let (s, e) = clip_segment_to_convex((-5.0, 5.0), (15.0, 5.0), &square).unwrap();
        assert_relative_eq!(s.0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(e.0, 10.0, epsilon = 1e-12);

        assert!(clip_segment_to_convex((-5.0, 20.0), (15.0, 20.0), &square).is_none());
        // Touching a corner is a point, not a usable overlap.
        assert!(clip_segment_to_convex((-5.0, 5.0), (5.0, -5.0), &square).is_none());
        // Running along an edge is kept.
        assert!(clip_segment_to_convex((2.0, 0.0), (8.0, 0.0), &square).is_some());
    }

    #[test]
    fn test_nfp_cache() {
        let mut cache = NfpCache::new();
        let key = NfpKey::new(0, 0.0, 1, 90.0);
        let mut computed = 0;

        for _ in 0..3 {
            let shape = cache
                .get_or_compute(key, || {
                    computed += 1;
                    Ok(Shape::Single(rect(0.0, 0.0, 1.0, 1.0)))
                })
                .unwrap();
            assert_relative_eq!(shape.area(), 1.0);
        }
        assert_eq!(computed, 1);
        assert_eq!(cache.stats(), (2, 1));

        cache
            .get_or_compute(NfpKey::new(0, 0.0, 1, 45.0), || Ok(Shape::Single(rect(0.0, 0.0, 2.0, 2.0))))
            .unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_nfp_cache_eviction() {
        let mut cache = NfpCache::with_capacity(4);
        for i in 0..10 {
            cache
                .get_or_compute(NfpKey::new(i, 0.0, 0, 0.0), || Ok(Shape::Single(rect(0.0, 0.0, 1.0, 1.0))))
                .unwrap();
        }
        assert!(cache.len() <= 4);
    }
}
