//! Boolean polygon operations backed by `i_overlay`.

use crate::geometry::{Polygon2D, Shape};
use fpp_core::robust::signed_area_robust;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

type Contour = Vec<[f64; 2]>;

fn to_contour(polygon: &Polygon2D) -> Contour {
    polygon.vertices().iter().map(|&(x, y)| [x, y]).collect()
}

/// Unions polygons into a single polygon or a multi-part shape.
///
/// Only outer boundaries survive; interior holes of the union are dropped.
/// Returns `None` for empty input or when every part collapses.
pub fn union_polygons(polygons: &[Polygon2D]) -> Option<Shape> {
    let (first, rest) = polygons.split_first()?;
    if rest.is_empty() {
        return Some(Shape::Single(first.clone()));
    }

    let mut result: Vec<Contour> = vec![to_contour(first)];

    for polygon in rest {
        let clip = to_contour(polygon);
        let shapes = result.overlay(&[clip], OverlayRule::Union, FillRule::NonZero);

        let merged: Vec<Contour> = shapes
            .into_iter()
            .filter_map(|shape| shape.into_iter().next())
            .filter(|outer| outer.len() >= 3)
            .collect();

        if merged.is_empty() {
            log::warn!("union collapsed to nothing; keeping previous parts");
            continue;
        }
        result = merged;
    }

    let parts: Vec<Polygon2D> = result
        .into_iter()
        .filter_map(|contour| Polygon2D::new(contour.into_iter().map(|[x, y]| (x, y)).collect()).ok())
        .collect();

    Shape::from_parts(parts)
}

/// Every boundary ring of the union: outer contours counter-clockwise,
/// hole contours clockwise.
///
/// Unlike [`union_polygons`] the holes are kept, so pockets enclosed by the
/// inputs show up as their own rings.
pub fn union_boundary_rings(polygons: &[Polygon2D]) -> Vec<Vec<(f64, f64)>> {
    let Some((first, rest)) = polygons.split_first() else {
        return Vec::new();
    };

    let mut result: Vec<Contour> = vec![to_contour(first)];
    for polygon in rest {
        let clip = to_contour(polygon);
        let shapes = result.overlay(&[clip], OverlayRule::Union, FillRule::NonZero);

        let mut merged: Vec<Contour> = Vec::new();
        for shape in shapes {
            for (k, mut contour) in shape.into_iter().enumerate() {
                if contour.len() < 3 {
                    continue;
                }
                // Outer first, holes after; NonZero needs them wound oppositely.
                let ring: Vec<(f64, f64)> = contour.iter().map(|&[x, y]| (x, y)).collect();
                if (k == 0) != (signed_area_robust(&ring) > 0.0) {
                    contour.reverse();
                }
                merged.push(contour);
            }
        }

        if merged.is_empty() {
            log::warn!("union collapsed to nothing; keeping previous rings");
            continue;
        }
        result = merged;
    }

    result
        .into_iter()
        .map(|contour| contour.into_iter().map(|[x, y]| (x, y)).collect())
        .collect()
}

/// Area of the intersection of two polygons.
pub fn intersection_area(a: &Polygon2D, b: &Polygon2D) -> f64 {
    if !a.aabb().intersects(&b.aabb()) {
        return 0.0;
    }

    let subject = vec![to_contour(a)];
    let clip = vec![to_contour(b)];
    let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::NonZero);

    shapes
        .iter()
        .map(|shape| {
            let mut contours = shape.iter().map(|contour| {
                let ring: Vec<(f64, f64)> = contour.iter().map(|&[x, y]| (x, y)).collect();
                signed_area_robust(&ring).abs()
            });
            let outer = contours.next().unwrap_or(0.0);
            outer - contours.sum::<f64>()
        })
        .sum()
}
