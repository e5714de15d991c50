//! # FPP Pattern
//!
//! Turns a foundation paper piecing diagram, given as loose seam segments,
//! into sewable assemblies and printable pages.
//!
//! ## Stages
//!
//! 1. [`polygonize`] - snap, node and trace the segments into closed pieces
//! 2. [`adjacency`] and [`seams`] - touch graph and seam precedence
//! 3. [`grouping`] - greedy convex assemblies in sewing order
//! 4. [`allowance`] - hull of each assembly grown by the seam allowance
//! 5. [`nester`] - NFP placement of the allowance shapes onto pages
//!
//! [`Pipeline`] runs all of them; each stage is also usable on its own.
//!
//! ## Quick Start
//!
//! ```rust
//! use fpp_pattern::{Config, Pipeline, Segment};
//!
//! // A 4 x 4 inch block split by one diagonal, drawn at 10 units per inch.
//! let segments = vec![
//!     Segment::new((0.0, 0.0), (40.0, 0.0)),
//!     Segment::new((40.0, 0.0), (40.0, 40.0)),
//!     Segment::new((40.0, 40.0), (0.0, 40.0)),
//!     Segment::new((0.0, 40.0), (0.0, 0.0)),
//!     Segment::new((0.0, 0.0), (40.0, 40.0)),
//! ];
//!
//! let config = Config::new()
//!     .with_units_per_inch(10.0)
//!     .with_seam_order_tolerance(1.0)
//!     .with_allowance(0.25);
//!
//! let layout = Pipeline::new(config).run(&segments).unwrap();
//! assert_eq!(layout.polygons.len(), 2);
//! println!(
//!     "{} groups on {} pages",
//!     layout.groups.len(),
//!     layout.layout.page_count()
//! );
//! ```
//!
//! ## Labels and colors
//!
//! ```rust
//! use fpp_pattern::labeling::{int_to_label, label_groups};
//! use fpp_pattern::palette::distinct_colors;
//!
//! assert_eq!(int_to_label(26), "AA");
//! let labels = label_groups(&[vec![1, 0]], None);
//! assert_eq!(labels[&1], "A1");
//! assert_eq!(distinct_colors(3, true, 42).len(), 3);
//! ```

pub mod adjacency;
pub mod allowance;
pub mod geometry;
pub mod grouping;
pub mod labeling;
pub mod nester;
pub mod nfp;
pub mod offset;
pub mod overlay;
pub mod palette;
pub mod pipeline;
pub mod polygonize;
pub mod seams;
pub mod spatial_index;

// Re-exports
pub use adjacency::AdjacencyGraph;
pub use allowance::build_seam_allowances;
pub use geometry::{Polygon2D, Shape};
pub use grouping::{find_exact_full_shared_edge, group_polygons, is_concave, Assembly};
pub use nester::PageNester;
pub use nfp::{inner_fit_polygon, minkowski_difference, minkowski_sum, no_fit_polygon};
pub use offset::{offset_convex, JoinStyle};
pub use pipeline::{PatternLayout, Pipeline};
pub use polygonize::build_polygons;
pub use seams::{classify_seams, diagram_outline, polygon_max_seam_order, SeamOrder};
pub use spatial_index::{SpatialEntry2D, SpatialIndex2D};
pub use fpp_core::{
    Config, Error, LayoutResult, Outline, Page, Placement, Result, Segment, Transform2D, AABB2D,
};
