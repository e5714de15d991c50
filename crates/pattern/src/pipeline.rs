//! End-to-end run from seam segments to printed pages.

use crate::adjacency::AdjacencyGraph;
use crate::allowance::build_seam_allowances;
use crate::geometry::Polygon2D;
use crate::grouping::group_polygons;
use crate::nester::PageNester;
use crate::polygonize::build_polygons;
use crate::seams::{classify_seams, diagram_outline, SeamOrder};
use fpp_core::{Config, LayoutResult, Result, Segment};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything the pipeline produces, stage by stage.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternLayout {
    /// Reconstructed pieces, in face discovery order.
    pub polygons: Vec<Polygon2D>,
    /// Touch graph over `polygons`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub adjacency: AdjacencyGraph,
    /// Order of every input segment.
    pub seam_orders: SeamOrder,
    /// Assemblies as ordered polygon indices.
    pub groups: Vec<Vec<usize>>,
    /// Seam-allowance outline of every group.
    pub allowances: Vec<Polygon2D>,
    /// Pages of placed allowance shapes.
    pub layout: LayoutResult,
}

impl PatternLayout {
    /// Returns true if no piece was reconstructed.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Runs every stage with one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds, groups, pads and nests the pieces described by `segments`.
    ///
    /// A diagram without closed regions yields an empty layout. Errors come
    /// from an invalid configuration or from pieces that fit on no page.
    pub fn run(&self, segments: &[Segment]) -> Result<PatternLayout> {
        self.config.validate()?;

        let polygons = build_polygons(segments, &self.config);
        let Some(outline) = diagram_outline(&polygons) else {
            log::warn!("diagram has no closed regions; nothing to lay out");
            return Ok(PatternLayout {
                seam_orders: SeamOrder::from_orders(vec![None; segments.len()]),
                ..Default::default()
            });
        };

        let adjacency = AdjacencyGraph::build(&polygons);
        let seam_orders = classify_seams(segments, &outline, &self.config);
        let groups = group_polygons(&polygons, &adjacency, segments, &seam_orders, &self.config);
        let allowances = build_seam_allowances(&polygons, &groups, &self.config)?;
        let layout = PageNester::new(self.config.clone()).nest(&allowances)?;

        log::info!(
            "{} segments -> {} pieces in {} groups on {} pages",
            segments.len(),
            polygons.len(),
            groups.len(),
            layout.page_count()
        );

        Ok(PatternLayout {
            polygons,
            adjacency,
            seam_orders,
            groups,
            allowances,
            layout,
        })
    }
}
