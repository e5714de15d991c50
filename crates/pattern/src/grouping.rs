//! Assembly grouping.
//!
//! Polygons are merged greedily into convex assemblies. Each assembly starts
//! from the smallest polygon among those touching the highest-order seams
//! still available, then absorbs neighbours that share exactly one full edge
//! with its current outline, as long as the merged outline stays convex.

use crate::adjacency::AdjacencyGraph;
use crate::geometry::{Polygon2D, Shape};
use crate::overlay::union_polygons;
use crate::seams::{polygon_max_seam_order, SeamOrder};
use fpp_core::{Config, Segment};

/// A grown assembly: member indices in the order they were added, and the
/// convex outline covering them.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub members: Vec<usize>,
    pub shape: Polygon2D,
}

/// Returns true if `a` and `b` have exactly one pair of edges whose
/// endpoints coincide within `tol`, in either direction.
pub fn find_exact_full_shared_edge(a: &Polygon2D, b: &Polygon2D, tol: f64) -> bool {
    let close = |p: (f64, f64), q: (f64, f64)| (p.0 - q.0).abs() <= tol && (p.1 - q.1).abs() <= tol;

    let mut matches = 0;
    for (a1, a2) in a.edges() {
        for (b1, b2) in b.edges() {
            if (close(a1, b2) && close(a2, b1)) || (close(a1, b1) && close(a2, b2)) {
                matches += 1;
                if matches > 1 {
                    return false;
                }
            }
        }
    }
    matches == 1
}

/// Returns true if the hull of `shape` exceeds its area by more than
/// `tol` relative to that area. A hull no larger than the shape is convex.
pub fn is_concave(shape: &Polygon2D, tol: f64) -> bool {
    let area = shape.area();
    let hull_area = shape.convex_hull().area();
    if hull_area <= area || area <= 0.0 {
        return false;
    }
    (hull_area - area) / area > tol
}

/// Partitions every polygon index into ordered assemblies.
pub fn group_polygons(
    polygons: &[Polygon2D],
    adjacency: &AdjacencyGraph,
    segments: &[Segment],
    seam_orders: &SeamOrder,
    config: &Config,
) -> Vec<Vec<usize>> {
    let n = polygons.len();
    let seam_rank: Vec<Option<u32>> = polygons
        .iter()
        .map(|p| polygon_max_seam_order(p, segments, seam_orders, config.seam_order_tolerance))
        .collect();

    let mut grouped = vec![false; n];
    let mut remaining = n;
    let mut groups = Vec::new();

    while remaining > 0 {
        let Some(seed) = select_seed(polygons, &seam_rank, &grouped) else {
            break;
        };

        let assembly = grow_group_from_seed(seed, polygons, adjacency, &grouped, config);
        for &member in &assembly.members {
            grouped[member] = true;
        }
        remaining -= assembly.members.len();

        log::debug!(
            "group {}: seed {seed} (seam order {:?}), members {:?}",
            groups.len(),
            seam_rank[seed],
            assembly.members
        );
        groups.push(assembly.members);
    }

    log::info!("grouped {n} polygons into {} assemblies", groups.len());
    groups
}

/// Highest seam order first, then smallest area, then lowest index.
fn select_seed(polygons: &[Polygon2D], seam_rank: &[Option<u32>], grouped: &[bool]) -> Option<usize> {
    let ungrouped = || (0..polygons.len()).filter(|&i| !grouped[i]);
    let top = ungrouped().map(|i| seam_rank[i]).max()?;

    ungrouped()
        .filter(|&i| seam_rank[i] == top)
        .min_by(|&a, &b| {
            polygons[a]
                .area()
                .total_cmp(&polygons[b].area())
                .then(a.cmp(&b))
        })
}

/// Grows one assembly from `seed`, skipping anything in `already_grouped`.
pub fn grow_group_from_seed(
    seed: usize,
    polygons: &[Polygon2D],
    adjacency: &AdjacencyGraph,
    already_grouped: &[bool],
    config: &Config,
) -> Assembly {
    let mut members = vec![seed];
    let mut taken: Vec<bool> = (0..polygons.len())
        .map(|i| already_grouped.get(i).copied().unwrap_or(false))
        .collect();
    taken[seed] = true;
    let mut current = polygons[seed].clone();

    loop {
        let mut candidates: Vec<usize> = Vec::new();
        for &member in &members {
            for neighbor in adjacency.neighbors(member) {
                if !taken[neighbor] && !candidates.contains(&neighbor) {
                    candidates.push(neighbor);
                }
            }
        }

        let next = candidates.into_iter().find_map(|neighbor| {
            let candidate = &polygons[neighbor];
            if !find_exact_full_shared_edge(candidate, &current, config.edge_tolerance) {
                return None;
            }
            let merged = match union_polygons(&[current.clone(), candidate.clone()]) {
                Some(Shape::Single(p)) => p,
                Some(other) => {
                    log::trace!("union with {neighbor} gave a {}", other.kind());
                    return None;
                }
                None => return None,
            };
            if is_concave(&merged, config.concave_tolerance) {
                log::trace!("union with {neighbor} is concave");
                return None;
            }
            let outline = merged
                .convex_hull()
                .remove_collinear_points(config.collinear_tolerance);
            Some((neighbor, outline))
        });

        match next {
            Some((neighbor, outline)) => {
                members.push(neighbor);
                taken[neighbor] = true;
                current = outline;
            }
            None => break,
        }
    }

    Assembly {
        members,
        shape: current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, s: f64) -> Polygon2D {
        Polygon2D::rectangle(x, y, s, s).unwrap()
    }

    fn group(polygons: &[Polygon2D]) -> Vec<Vec<usize>> {
        let adjacency = AdjacencyGraph::build(polygons);
        group_polygons(polygons, &adjacency, &[], &SeamOrder::default(), &Config::default())
    }

    #[test]
    fn test_find_exact_full_shared_edge() {
        let a = square(0.0, 0.0, 1.0);
        assert!(find_exact_full_shared_edge(&a, &square(1.0, 0.0, 1.0), 1e-6));
        assert!(!find_exact_full_shared_edge(&a, &square(1.0, 0.5, 1.0), 1e-6));
        assert!(!find_exact_full_shared_edge(&a, &square(1.0, 1.0, 1.0), 1e-6));
        assert!(!find_exact_full_shared_edge(&a, &square(5.0, 0.0, 1.0), 1e-6));
        // Identical squares share four edges, not one.
        assert!(!find_exact_full_shared_edge(&a, &a, 1e-6));
        // Within tolerance.
        assert!(find_exact_full_shared_edge(&a, &square(1.005, 0.0, 1.0), 1e-2));
    }

    #[test]
    fn test_is_concave() {
        let convex = square(0.0, 0.0, 2.0);
        let dented = Polygon2D::new(vec![(0.0, 0.0), (2.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 2.0)]).unwrap();
        assert!(!is_concave(&convex, 1e-2));
        assert!(is_concave(&dented, 1e-2));
        // A tiny dent stays under the tolerance.
        let nicked = Polygon2D::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (9.99, 5.01), (10.0, 10.0), (0.0, 10.0)])
            .unwrap();
        assert!(!is_concave(&nicked, 1e-2));
    }

    #[test]
    fn test_row_of_squares_is_one_group() {
        let polys: Vec<Polygon2D> = (0..4).map(|i| square(i as f64, 0.0, 1.0)).collect();
        assert_eq!(group(&polys), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_grid_splits_into_rows() {
        let polys = vec![
            square(0.0, 0.0, 1.0),
            square(1.0, 0.0, 1.0),
            square(0.0, 1.0, 1.0),
            square(1.0, 1.0, 1.0),
        ];
        assert_eq!(group(&polys), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_seed_is_smallest_area() {
        let polys = vec![square(0.0, 0.0, 2.0), square(2.0, 0.0, 1.0), square(10.0, 0.0, 1.0)];
        let groups = group(&polys);
        // The unit square at index 1 seeds first. It covers only half of the
        // big square's right edge, so the two stay apart.
        assert_eq!(groups[0][0], 1);
        let mut all: Vec<usize> = groups.concat();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn test_seed_prefers_higher_seam_order() {
        let polys = vec![square(0.0, 0.0, 1.0), square(5.0, 0.0, 3.0)];
        let segments = vec![
            Segment::new((5.0, 0.0), (8.0, 0.0)),
            Segment::new((0.0, 0.0), (1.0, 0.0)),
        ];
        let orders = SeamOrder::from_orders(vec![Some(2), Some(0)]);
        let adjacency = AdjacencyGraph::build(&polys);
        let config = Config::default().with_seam_order_tolerance(0.1);

        let groups = group_polygons(&polys, &adjacency, &segments, &orders, &config);
        assert_eq!(groups, vec![vec![1], vec![0]]);
    }

    #[test]
    fn test_concave_union_rejected() {
        // The rectangle's top is split so the square matches one full edge,
        // but the merged L shape is concave.
        let rect_split = Polygon2D::new(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let polys = vec![rect_split, square(0.0, 1.0, 1.0)];
        let adjacency = AdjacencyGraph::build(&polys);
        let assembly = grow_group_from_seed(1, &polys, &adjacency, &[false, false], &Config::default());
        assert_eq!(assembly.members, vec![1]);
    }

    #[test]
    fn test_assembly_outline_is_convex() {
        let polys: Vec<Polygon2D> = (0..3).map(|i| square(i as f64, 0.0, 1.0)).collect();
        let adjacency = AdjacencyGraph::build(&polys);
        let assembly = grow_group_from_seed(0, &polys, &adjacency, &[false; 3], &Config::default());
        assert_eq!(assembly.members, vec![0, 1, 2]);
        assert!(assembly.shape.is_convex());
        assert_eq!(assembly.shape.len(), 4);
        assert!((assembly.shape.area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(group(&[]).is_empty());
    }
}
