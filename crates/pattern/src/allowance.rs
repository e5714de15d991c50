//! Seam-allowance outlines, one per assembly.

use crate::geometry::{Polygon2D, Shape};
use crate::offset::{offset_convex, JoinStyle};
use crate::overlay::union_polygons;
use fpp_core::{Config, Error, Result};

/// Builds the cut outline of every group.
///
/// Members are unioned, replaced by their convex hull, cleaned of collinear
/// vertices and grown by `config.allowance_units()` with a mitre join.
/// The output is indexed like `groups`.
pub fn build_seam_allowances(
    polygons: &[Polygon2D],
    groups: &[Vec<usize>],
    config: &Config,
) -> Result<Vec<Polygon2D>> {
    let join = JoinStyle::Mitre {
        limit: config.mitre_limit,
    };
    let allowance = config.allowance_units();

    groups
        .iter()
        .enumerate()
        .map(|(group_index, members)| {
            let hull = group_hull(polygons, group_index, members, config)?;
            offset_convex(&hull, allowance, join)
        })
        .collect()
}

/// Convex outline of one group before the allowance is added.
pub fn group_hull(
    polygons: &[Polygon2D],
    group_index: usize,
    members: &[usize],
    config: &Config,
) -> Result<Polygon2D> {
    let parts = members
        .iter()
        .map(|&i| {
            polygons.get(i).cloned().ok_or_else(|| {
                Error::Internal(format!("group {group_index} refers to missing polygon {i}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let union = union_polygons(&parts).ok_or_else(|| {
        Error::DegenerateGeometry(format!("group {group_index} has no area to cover"))
    })?;
    if let Shape::Multi(pieces) = &union {
        log::warn!(
            "group {group_index} unions into {} disjoint parts; using their hull",
            pieces.len()
        );
    }

    Ok(union.convex_hull()?.remove_collinear_points(config.collinear_tolerance))
}
