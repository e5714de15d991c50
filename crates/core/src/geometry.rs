//! Core geometry types and traits.

use crate::robust::signed_area_robust;
use crate::transform::AABB2D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight seam line between two points in diagram units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Start point.
    pub start: (f64, f64),
    /// End point.
    pub end: (f64, f64),
}

impl Segment {
    /// Creates a segment from its endpoints.
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        let dx = self.end.0 - self.start.0;
        let dy = self.end.1 - self.start.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns true if both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// The same segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    pub fn aabb(&self) -> AABB2D {
        AABB2D::new(
            self.start.0.min(self.end.0),
            self.start.1.min(self.end.1),
            self.start.0.max(self.end.0),
            self.start.1.max(self.end.1),
        )
    }

    /// Returns true if all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.start.0.is_finite()
            && self.start.1.is_finite()
            && self.end.0.is_finite()
            && self.end.1.is_finite()
    }
}

impl From<((f64, f64), (f64, f64))> for Segment {
    fn from((start, end): ((f64, f64), (f64, f64))) -> Self {
        Self::new(start, end)
    }
}

/// Anything with closed outer rings that the pipeline can measure and place.
pub trait Outline {
    /// The outer rings, one per part, without a repeated closing vertex.
    fn rings(&self) -> Vec<&[(f64, f64)]>;

    /// Total enclosed area.
    fn measure(&self) -> f64 {
        self.rings()
            .iter()
            .map(|ring| signed_area_robust(ring).abs())
            .sum()
    }

    /// Bounding box of every ring, `None` when empty.
    fn bounding_box(&self) -> Option<AABB2D> {
        self.rings()
            .iter()
            .filter_map(|ring| AABB2D::from_points(ring))
            .reduce(|a, b| a.union(&b))
    }

    /// All vertices of all rings.
    fn vertices(&self) -> Vec<(f64, f64)> {
        self.rings().iter().flat_map(|r| r.iter().copied()).collect()
    }
}

impl Outline for Vec<(f64, f64)> {
    fn rings(&self) -> Vec<&[(f64, f64)]> {
        if self.is_empty() {
            Vec::new()
        } else {
            vec![self.as_slice()]
        }
    }
}
