//! Polygon ring and tagged shape types.

use fpp_core::geometry::Outline;
use fpp_core::robust::{is_convex_robust, signed_area_robust};
use fpp_core::transform::{Transform2D, AABB2D};
use fpp_core::{Error, Result};
use geo::{Centroid, Contains, ConvexHull, Coord, Intersects, LineString, Polygon as GeoPolygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A simple polygon stored as a counter-clockwise ring without a repeated
/// closing vertex.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon2D {
    vertices: Vec<(f64, f64)>,
}

impl Polygon2D {
    /// Builds a polygon from a ring in either winding.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped.
    /// Fails when fewer than three distinct vertices remain or the ring
    /// encloses no area.
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self> {
        if vertices.iter().any(|&(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(Error::InvalidGeometry(
                "polygon has non-finite coordinates".into(),
            ));
        }

        let mut ring: Vec<(f64, f64)> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "polygon must have at least 3 distinct vertices, got {}",
                ring.len()
            )));
        }

        let area = signed_area_robust(&ring);
        if area == 0.0 {
            return Err(Error::DegenerateGeometry("polygon has zero area".into()));
        }
        if area < 0.0 {
            ring.reverse();
        }

        Ok(Self { vertices: ring })
    }

    /// Axis-aligned rectangle with its minimum corner at `(x, y)`.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        Self::new(vec![
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
        ])
    }

    /// Wraps a ring the caller already knows to be a valid CCW polygon.
    pub(crate) fn from_ccw_unchecked(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    /// Converts a `geo` polygon, ignoring interior rings.
    pub fn from_geo_polygon(polygon: &GeoPolygon<f64>) -> Result<Self> {
        Self::new(polygon.exterior().coords().map(|c| (c.x, c.y)).collect())
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<(f64, f64)> {
        self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Enclosed area (always positive).
    pub fn area(&self) -> f64 {
        signed_area_robust(&self.vertices).abs()
    }

    /// Area centroid.
    pub fn centroid(&self) -> (f64, f64) {
        match self.to_geo_polygon().centroid() {
            Some(c) => (c.x(), c.y()),
            None => vertex_mean(&self.vertices),
        }
    }

    pub fn aabb(&self) -> AABB2D {
        AABB2D::from_points(&self.vertices).unwrap_or(AABB2D::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Edges as `(start, end)` pairs in ring order, closing edge last.
    pub fn edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Converts to a geo crate Polygon.
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        GeoPolygon::new(
            LineString::from(
                self.vertices
                    .iter()
                    .map(|&(x, y)| Coord { x, y })
                    .collect::<Vec<_>>(),
            ),
            vec![],
        )
    }

    /// Convex hull of the ring.
    pub fn convex_hull(&self) -> Polygon2D {
        Self::hull_of_points(&self.vertices).unwrap_or_else(|_| self.clone())
    }

    /// Convex hull of an arbitrary point set.
    pub fn hull_of_points(points: &[(f64, f64)]) -> Result<Polygon2D> {
        Self::new(convex_hull_of_points(points))
    }

    pub fn is_convex(&self) -> bool {
        is_convex_robust(&self.vertices)
    }

    /// Drops every vertex `b` whose neighbours `a`, `c` satisfy
    /// `|cross(b - a, c - a)| < tolerance`, until none remain.
    ///
    /// The result never has fewer than three vertices, so applying it twice
    /// gives the same ring as applying it once.
    pub fn remove_collinear_points(&self, tolerance: f64) -> Polygon2D {
        let mut ring = self.vertices.clone();

        while ring.len() > 3 {
            let n = ring.len();
            let hit = (0..n).find(|&i| {
                let a = ring[(i + n - 1) % n];
                let b = ring[i];
                let c = ring[(i + 1) % n];
                let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
                cross.abs() < tolerance
            });
            match hit {
                Some(i) => {
                    ring.remove(i);
                }
                None => break,
            }
        }

        Self::from_ccw_unchecked(ring)
    }

    pub fn transformed(&self, transform: &Transform2D) -> Polygon2D {
        Self::from_ccw_unchecked(transform.apply_ring(&self.vertices))
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Polygon2D {
        Self::from_ccw_unchecked(self.vertices.iter().map(|&(x, y)| (x + dx, y + dy)).collect())
    }

    /// Rotates by `angle` radians about `pivot`.
    pub fn rotated_about(&self, angle: f64, pivot: (f64, f64)) -> Polygon2D {
        self.transformed(&Transform2D::rotation_about(angle, pivot))
    }

    /// Point reflection through the origin.
    pub fn negated(&self) -> Polygon2D {
        Self::from_ccw_unchecked(self.vertices.iter().map(|&(x, y)| (-x, -y)).collect())
    }

    /// Returns true if the closed polygons share at least one point.
    pub fn intersects(&self, other: &Polygon2D) -> bool {
        self.aabb().intersects(&other.aabb())
            && self.to_geo_polygon().intersects(&other.to_geo_polygon())
    }

    /// Returns true if `other` lies inside this polygon.
    pub fn contains_polygon(&self, other: &Polygon2D) -> bool {
        self.aabb().contains(&other.aabb())
            && self.to_geo_polygon().contains(&other.to_geo_polygon())
    }
}

impl Outline for Polygon2D {
    fn rings(&self) -> Vec<&[(f64, f64)]> {
        vec![self.vertices.as_slice()]
    }
}

/// Result of a boolean operation: one polygon or several disjoint parts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    Single(Polygon2D),
    Multi(Vec<Polygon2D>),
}

impl Shape {
    /// Wraps a list of parts, `None` when it is empty.
    pub fn from_parts(mut parts: Vec<Polygon2D>) -> Option<Shape> {
        match parts.len() {
            0 => None,
            1 => parts.pop().map(Shape::Single),
            _ => Some(Shape::Multi(parts)),
        }
    }

    pub fn parts(&self) -> &[Polygon2D] {
        match self {
            Shape::Single(p) => std::slice::from_ref(p),
            Shape::Multi(parts) => parts,
        }
    }

    pub fn area(&self) -> f64 {
        self.parts().iter().map(Polygon2D::area).sum()
    }

    /// Human-readable kind, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            Shape::Single(_) => "polygon".to_string(),
            Shape::Multi(parts) => format!("multi-polygon with {} parts", parts.len()),
        }
    }

    /// Unwraps a single polygon; a multi-part shape is an error.
    pub fn into_single(self) -> Result<Polygon2D> {
        match self {
            Shape::Single(p) => Ok(p),
            other => Err(Error::UnexpectedGeometry {
                expected: "polygon",
                found: other.kind(),
            }),
        }
    }

    /// Convex hull of every vertex of every part.
    pub fn convex_hull(&self) -> Result<Polygon2D> {
        match self {
            Shape::Single(p) => Ok(p.convex_hull()),
            Shape::Multi(_) => Polygon2D::hull_of_points(&self.vertices()),
        }
    }
}

impl Outline for Shape {
    fn rings(&self) -> Vec<&[(f64, f64)]> {
        self.parts().iter().map(Polygon2D::vertices).collect()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Computes the convex hull of a set of points (CCW, no closing vertex).
pub(crate) fn convex_hull_of_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let coords: Vec<Coord<f64>> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
    let hull = LineString::from(coords).convex_hull();

    let ring = hull.exterior();
    let closed = ring.coords().count();
    ring.coords()
        .take(closed.saturating_sub(1))
        .map(|c| (c.x, c.y))
        .collect()
}

fn vertex_mean(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    (sx / n, sy / n)
}
