//! Fixed-distance offset of convex polygons.
//!
//! Positive distances grow the polygon by pushing every edge outward along
//! its normal and joining neighbouring edges at the corners. Negative
//! distances erode it by clipping against the inward-shifted edge lines.

use crate::geometry::Polygon2D;
use fpp_core::{Error, Result};

/// Corner treatment for outward offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinStyle {
    /// Extend neighbouring edges until they meet. Corners whose mitre would
    /// reach further than `limit × distance` from the vertex are bevelled.
    Mitre { limit: f64 },
    /// Cut every corner with a straight edge.
    Bevel,
}

impl Default for JoinStyle {
    fn default() -> Self {
        JoinStyle::Mitre { limit: 5.0 }
    }
}

/// Offsets a convex polygon by `distance`.
pub fn offset_convex(polygon: &Polygon2D, distance: f64, join: JoinStyle) -> Result<Polygon2D> {
    if !distance.is_finite() {
        return Err(Error::InvalidGeometry(format!(
            "offset distance must be finite, got {distance}"
        )));
    }
    if !polygon.is_convex() {
        return Err(Error::InvalidGeometry(
            "offset_convex requires a convex polygon".into(),
        ));
    }

    if distance == 0.0 {
        Ok(polygon.clone())
    } else if distance > 0.0 {
        grow(polygon, distance, join)
    } else {
        erode(polygon, -distance)
    }
}

fn outward_normal(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();
    (len > 0.0).then(|| (dy / len, -dx / len))
}

fn grow(polygon: &Polygon2D, d: f64, join: JoinStyle) -> Result<Polygon2D> {
    let v = polygon.vertices();
    let n = v.len();
    let normals: Vec<(f64, f64)> = (0..n)
        .filter_map(|i| outward_normal(v[i], v[(i + 1) % n]))
        .collect();
    if normals.len() != n {
        return Err(Error::InvalidGeometry("polygon has a zero-length edge".into()));
    }

    let limit = match join {
        JoinStyle::Mitre { limit } => limit.max(1.0),
        JoinStyle::Bevel => 1.0,
    };

    let mut out = Vec::with_capacity(2 * n);
    for i in 0..n {
        let p = v[i];
        let n_prev = normals[(i + n - 1) % n];
        let n_next = normals[i];
        let dot = n_prev.0 * n_next.0 + n_prev.1 * n_next.1;

        let sum = (n_prev.0 + n_next.0, n_prev.1 + n_next.1);
        let mitre_len = if dot > -1.0 + 1e-12 {
            (sum.0 * sum.0 + sum.1 * sum.1).sqrt() / (1.0 + dot)
        } else {
            f64::INFINITY
        };

        let bevel = matches!(join, JoinStyle::Bevel) && dot < 1.0 - 1e-12;
        if !bevel && mitre_len <= limit {
            let k = d / (1.0 + dot);
            out.push((p.0 + k * sum.0, p.1 + k * sum.1));
        } else {
            out.push((p.0 + d * n_prev.0, p.1 + d * n_prev.1));
            out.push((p.0 + d * n_next.0, p.1 + d * n_next.1));
        }
    }

    Polygon2D::new(out)
}

/// Clips the polygon against every edge line shifted inward by `d`.
fn erode(polygon: &Polygon2D, d: f64) -> Result<Polygon2D> {
    let v = polygon.vertices();
    let n = v.len();
    let mut ring: Vec<(f64, f64)> = v.to_vec();

    for i in 0..n {
        let Some(normal) = outward_normal(v[i], v[(i + 1) % n]) else {
            continue;
        };
        // Keep points with normal · p <= normal · v[i] - d.
        let c = normal.0 * v[i].0 + normal.1 * v[i].1 - d;
        ring = clip_half_plane(&ring, normal, c);
        if ring.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "eroding by {d} collapses the polygon"
            )));
        }
    }

    Polygon2D::new(ring)
        .map_err(|_| Error::DegenerateGeometry(format!("eroding by {d} collapses the polygon")))
}

/// Keeps the part of `ring` where `normal · p <= c`.
pub(crate) fn clip_half_plane(ring: &[(f64, f64)], normal: (f64, f64), c: f64) -> Vec<(f64, f64)> {
    let side = |p: (f64, f64)| normal.0 * p.0 + normal.1 * p.1 - c;
    let n = ring.len();
    let mut out = Vec::with_capacity(n + 1);

    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let sa = side(a);
        let sb = side(b);

        if sa <= 0.0 {
            out.push(a);
        }
        if (sa < 0.0 && sb > 0.0) || (sa > 0.0 && sb < 0.0) {
            let t = sa / (sa - sb);
            out.push((a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon2D {
        Polygon2D::rectangle(0.0, 0.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_mitre_grow_square() {
        let grown = offset_convex(&unit_square(), 0.5, JoinStyle::default()).unwrap();
        assert_eq!(grown.len(), 4);
        assert_relative_eq!(grown.area(), 4.0, epsilon = 1e-9);
        let bb = grown.aabb();
        assert_relative_eq!(bb.min_x, -0.5, epsilon = 1e-12);
        assert_relative_eq!(bb.max_y, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bevel_grow_square() {
        let grown = offset_convex(&unit_square(), 0.5, JoinStyle::Bevel).unwrap();
        assert_eq!(grown.len(), 8);
        // 2x2 box minus four corner triangles of area 0.125.
        assert_relative_eq!(grown.area(), 4.0 - 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sharp_corner_falls_back_to_bevel() {
        let sliver = Polygon2D::new(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.5)]).unwrap();
        let mitred = offset_convex(&sliver, 1.0, JoinStyle::Mitre { limit: 100.0 }).unwrap();
        let limited = offset_convex(&sliver, 1.0, JoinStyle::Mitre { limit: 2.0 }).unwrap();
        assert_eq!(mitred.len(), 3);
        assert!(limited.len() > 3);
        assert!(limited.area() < mitred.area());
        assert!(limited.contains_polygon(&sliver));
    }

    #[test]
    fn test_erode_square() {
        let rect = Polygon2D::rectangle(0.0, 0.0, 4.0, 2.0).unwrap();
        let eroded = offset_convex(&rect, -0.5, JoinStyle::default()).unwrap();
        assert_relative_eq!(eroded.area(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(eroded.aabb().min_x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_erode_to_nothing_is_degenerate() {
        let result = offset_convex(&unit_square(), -0.6, JoinStyle::default());
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_concave_input_rejected() {
        let l = Polygon2D::new(vec![
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ])
        .unwrap();
        assert!(offset_convex(&l, 1.0, JoinStyle::default()).is_err());
    }
}
