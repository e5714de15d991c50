//! Layout result representation.

use crate::placement::Placement;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One printable page and the shapes placed on it, in placement order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page {
    /// Placements on this page.
    pub placements: Vec<Placement>,
}

impl Page {
    /// Creates an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group indices placed on this page, in placement order.
    pub fn group_indices(&self) -> Vec<usize> {
        self.placements.iter().map(|p| p.group_index).collect()
    }

    /// Returns true if nothing has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Result of a nesting pass.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutResult {
    /// Pages in creation order.
    pub pages: Vec<Page>,

    /// Utilization ratio (0.0 - 1.0).
    /// Calculated as: total placed shape area / (pages × printable area)
    pub utilization: f64,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl LayoutResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages used.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of placements across all pages.
    pub fn placement_count(&self) -> usize {
        self.pages.iter().map(|p| p.placements.len()).sum()
    }

    /// Every placed group index, page by page.
    pub fn group_indices(&self) -> Vec<usize> {
        self.pages.iter().flat_map(|p| p.group_indices()).collect()
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }
}
