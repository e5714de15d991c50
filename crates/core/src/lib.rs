//! # FPP Core
//!
//! Shared data model and ambient concerns for the foundation paper piecing
//! pipeline.
//!
//! This crate provides the types that every stage of `fpp-pattern` passes
//! around, independent of any polygon kernel.
//!
//! ## Core Components
//!
//! - **Input**: [`Segment`] - a straight seam line in diagram units
//! - **Configuration**: [`Config`] - tolerances, page geometry, unit scale
//! - **Units**: [`units::parse_length`] - `"8.5in"`, `"6mm"`, `"96px"` to inches
//! - **Transform types**: [`Transform2D`], [`AABB2D`]
//! - **Predicates**: [`robust`] - adaptive-precision orientation and segment tests
//! - **Output**: [`Placement`], [`Page`], [`LayoutResult`]
//!
//! ## Configuration
//!
//! ```rust
//! use fpp_core::Config;
//!
//! let config = Config::new()
//!     .with_units_per_inch(96.0)
//!     .with_page_size(8.5, 11.0)
//!     .with_margin(0.5)
//!     .with_allowance(0.25);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod result;
pub mod robust;
pub mod transform;
pub mod units;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use geometry::{Outline, Segment};
pub use placement::Placement;
pub use result::{LayoutResult, Page};
pub use transform::{Transform2D, AABB2D};
