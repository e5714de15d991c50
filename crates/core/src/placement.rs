//! Placement of one group's seam-allowance shape on a page.

use crate::transform::{normalize_degrees, Transform2D};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a group's seam-allowance shape sits on a page.
///
/// `placed_shape` equals the allowance ring rotated by `rotation_degrees`
/// about the origin and then shifted by `(translation_dx, translation_dy)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Index of the group this shape belongs to.
    pub group_index: usize,

    /// Counter-clockwise rotation in degrees, in `[0, 360)`.
    pub rotation_degrees: f64,

    /// Translation along x after rotation.
    pub translation_dx: f64,

    /// Translation along y after rotation.
    pub translation_dy: f64,

    /// The allowance ring in page coordinates.
    pub placed_shape: Vec<(f64, f64)>,
}

impl Placement {
    /// Creates a placement by applying `transform` to `source` (the ring as
    /// produced by the seam-allowance stage).
    pub fn from_transform(group_index: usize, source: &[(f64, f64)], transform: &Transform2D) -> Self {
        Self {
            group_index,
            rotation_degrees: transform.rotation_degrees(),
            translation_dx: transform.tx,
            translation_dy: transform.ty,
            placed_shape: transform.apply_ring(source),
        }
    }

    /// The rigid transform this placement applies to its source ring.
    pub fn transform(&self) -> Transform2D {
        Transform2D {
            rotation: normalize_degrees(self.rotation_degrees).to_radians(),
            tx: self.translation_dx,
            ty: self.translation_dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_transform_records_degrees_and_shape() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let t = Transform2D::rotation(-std::f64::consts::FRAC_PI_2)
            .then(&Transform2D::translation(5.0, 6.0));

        let p = Placement::from_transform(3, &square, &t);
        assert_eq!(p.group_index, 3);
        assert_relative_eq!(p.rotation_degrees, 270.0, epsilon = 1e-9);
        assert_relative_eq!(p.translation_dx, 5.0);
        assert_relative_eq!(p.translation_dy, 6.0);

        // (1, 0) rotated by -90 degrees is (0, -1).
        assert_relative_eq!(p.placed_shape[1].0, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.placed_shape[1].1, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_reproduces_placed_shape() {
        let tri = [(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)];
        let t = Transform2D::rotation_about(0.7, (1.0, 1.0)).then(&Transform2D::translation(-2.0, 9.0));
        let p = Placement::from_transform(0, &tri, &t);

        let again = p.transform().apply_ring(&tri);
        for (a, b) in again.iter().zip(&p.placed_shape) {
            assert_relative_eq!(a.0, b.0, epsilon = 1e-9);
            assert_relative_eq!(a.1, b.1, epsilon = 1e-9);
        }
    }
}
