//! Rigid 2D transforms and axis-aligned bounding boxes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB2D {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl AABB2D {
    /// Creates a bounding box from its corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a point set, or `None` when it is empty.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut aabb = Self::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            aabb.min_x = aabb.min_x.min(x);
            aabb.min_y = aabb.min_y.min(y);
            aabb.max_x = aabb.max_x.max(x);
            aabb.max_y = aabb.max_y.max(y);
        }
        Some(aabb)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns true if `other` lies inside this box (boundary inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Returns true if the boxes overlap or touch.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Corners in counter-clockwise order starting at the minimum corner.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }
}

/// Rotation followed by translation: `p' = R(rotation) * p + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform2D {
    /// Rotation angle in radians, counter-clockwise.
    pub rotation: f64,
    /// Translation along x.
    pub tx: f64,
    /// Translation along y.
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            rotation: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            rotation: 0.0,
            tx,
            ty,
        }
    }

    /// Rotation by `angle` radians about the origin.
    pub fn rotation(angle: f64) -> Self {
        Self {
            rotation: angle,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation by `angle` radians about `pivot`.
    pub fn rotation_about(angle: f64, pivot: (f64, f64)) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rotation: angle,
            tx: pivot.0 - (c * pivot.0 - s * pivot.1),
            ty: pivot.1 - (s * pivot.0 + c * pivot.1),
        }
    }

    /// Composes `self` followed by `next`.
    pub fn then(&self, next: &Self) -> Self {
        let (s, c) = next.rotation.sin_cos();
        Self {
            rotation: self.rotation + next.rotation,
            tx: c * self.tx - s * self.ty + next.tx,
            ty: s * self.tx + c * self.ty + next.ty,
        }
    }

    /// Applies the transform to a point.
    #[inline]
    pub fn apply(&self, p: (f64, f64)) -> (f64, f64) {
        let (s, c) = self.rotation.sin_cos();
        (c * p.0 - s * p.1 + self.tx, s * p.0 + c * p.1 + self.ty)
    }

    /// Applies the transform to every vertex of a ring.
    pub fn apply_ring(&self, ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let (s, c) = self.rotation.sin_cos();
        ring.iter()
            .map(|&(x, y)| (c * x - s * y + self.tx, s * x + c * y + self.ty))
            .collect()
    }

    /// Rotation in degrees normalized to `[0, 360)`.
    pub fn rotation_degrees(&self) -> f64 {
        normalize_degrees(self.rotation.to_degrees())
    }
}

/// Normalizes an angle in degrees to `[0, 360)`, snapping values within
/// 1e-9 of a full turn to zero.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if (360.0 - d).abs() < 1e-9 || d.abs() < 1e-9 {
        0.0
    } else {
        d
    }
}
