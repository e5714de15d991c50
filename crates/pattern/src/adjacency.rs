//! Polygon touch graph.

use crate::geometry::Polygon2D;
use crate::spatial_index::SpatialIndex2D;
use std::collections::BTreeSet;

/// Symmetric adjacency between polygon indices.
///
/// `j` is a neighbour of `i` when the closed polygons share at least one
/// point (a common edge, a single touching vertex, or an overlap).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyGraph {
    neighbors: Vec<BTreeSet<usize>>,
}

impl AdjacencyGraph {
    /// Builds the graph with an R*-tree broad phase and an exact
    /// intersection test on the surviving pairs.
    pub fn build(polygons: &[Polygon2D]) -> Self {
        let mut neighbors = vec![BTreeSet::new(); polygons.len()];

        let index = SpatialIndex2D::from_boxes(polygons.iter().map(Polygon2D::aabb));
        for (i, j) in index.candidate_pairs(0.0) {
            if polygons[i].intersects(&polygons[j]) {
                neighbors[i].insert(j);
                neighbors[j].insert(i);
            }
        }

        let edges: usize = neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2;
        log::debug!("adjacency: {} polygons, {} touching pairs", polygons.len(), edges);

        Self { neighbors }
    }

    /// Neighbours of `index` in ascending order; empty when out of range.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors.get(index).into_iter().flatten().copied()
    }

    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors.get(a).is_some_and(|set| set.contains(&b))
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn degree(&self, index: usize) -> usize {
        self.neighbors.get(index).map_or(0, BTreeSet::len)
    }
}
