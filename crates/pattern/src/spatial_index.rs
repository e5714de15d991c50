//! Broad-phase spatial indexing using an R*-tree.
//!
//! Every pairwise stage (segment splitting, polygon adjacency, overlap checks
//! against placed pieces) first narrows its candidates to items whose
//! bounding boxes overlap, then runs the exact predicate on those only.

use fpp_core::transform::AABB2D;
use rstar::{RTree, RTreeObject, AABB};

/// An indexed bounding box.
#[derive(Debug, Clone)]
pub struct SpatialEntry2D {
    /// Index of the item in the caller's list.
    pub index: usize,
    /// Bounding box of the item.
    pub aabb: AABB2D,
}

impl SpatialEntry2D {
    pub fn new(index: usize, aabb: AABB2D) -> Self {
        Self { index, aabb }
    }
}

impl RTreeObject for SpatialEntry2D {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.aabb.min_x, self.aabb.min_y],
            [self.aabb.max_x, self.aabb.max_y],
        )
    }
}

/// 2D spatial index using R*-tree for efficient overlap queries.
#[derive(Debug)]
pub struct SpatialIndex2D {
    tree: RTree<SpatialEntry2D>,
}

impl SpatialIndex2D {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-loads boxes, indexing each by its position in the iterator.
    pub fn from_boxes(boxes: impl IntoIterator<Item = AABB2D>) -> Self {
        let entries = boxes
            .into_iter()
            .enumerate()
            .map(|(index, aabb)| SpatialEntry2D::new(index, aabb))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, index: usize, aabb: AABB2D) {
        self.tree.insert(SpatialEntry2D::new(index, aabb));
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of entries whose boxes intersect (or touch) `aabb`, ascending.
    pub fn query_aabb(&self, aabb: &AABB2D) -> Vec<usize> {
        let envelope = AABB::from_corners([aabb.min_x, aabb.min_y], [aabb.max_x, aabb.max_y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Like [`query_aabb`](Self::query_aabb) with the box grown by `margin`.
    pub fn query_with_margin(&self, aabb: &AABB2D, margin: f64) -> Vec<usize> {
        self.query_aabb(&AABB2D::new(
            aabb.min_x - margin,
            aabb.min_y - margin,
            aabb.max_x + margin,
            aabb.max_y + margin,
        ))
    }

    /// Every unordered pair `(i, j)` with `i < j` whose boxes intersect,
    /// sorted lexicographically.
    pub fn candidate_pairs(&self, margin: f64) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .tree
            .iter()
            .flat_map(|entry| {
                self.query_with_margin(&entry.aabb, margin)
                    .into_iter()
                    .filter(move |&other| other > entry.index)
                    .map(move |other| (entry.index, other))
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

impl Default for SpatialIndex2D {
    fn default() -> Self {
        Self::new()
    }
}
