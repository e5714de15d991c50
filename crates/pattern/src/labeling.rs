//! Piece labels and label anchor points.

use crate::geometry::Polygon2D;
use std::collections::BTreeMap;

/// Converts a zero-based index to a spreadsheet-style column label:
/// `0 → "A"`, `25 → "Z"`, `26 → "AA"`, `701 → "ZZ"`, `702 → "AAA"`.
pub fn int_to_label(n: usize) -> String {
    let mut letters = Vec::new();
    let mut n = n + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    letters.into_iter().map(char::from).collect()
}

/// Maps every polygon index to `"<prefix><1-based position in its group>"`.
///
/// Group `g` uses `prefixes[g]` when given, otherwise `int_to_label(g)`.
pub fn label_groups(groups: &[Vec<usize>], prefixes: Option<&[&str]>) -> BTreeMap<usize, String> {
    let mut labels = BTreeMap::new();
    for (g, members) in groups.iter().enumerate() {
        let prefix = prefixes
            .and_then(|p| p.get(g))
            .map_or_else(|| int_to_label(g), |p| (*p).to_string());
        for (position, &polygon) in members.iter().enumerate() {
            labels.insert(polygon, format!("{prefix}{}", position + 1));
        }
    }
    labels
}

/// Area centroid of each requested polygon (all of them when `indices` is
/// `None`). Out-of-range indices are skipped.
pub fn label_positions(polygons: &[Polygon2D], indices: Option<&[usize]>) -> BTreeMap<usize, (f64, f64)> {
    match indices {
        Some(indices) => indices
            .iter()
            .filter_map(|&i| polygons.get(i).map(|p| (i, p.centroid())))
            .collect(),
        None => polygons.iter().enumerate().map(|(i, p)| (i, p.centroid())).collect(),
    }
}
