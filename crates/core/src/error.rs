//! Error types shared by every pipeline stage.

use thiserror::Error;

/// Errors produced while building, grouping or laying out pattern pieces.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A polygon or segment failed validation.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A length string could not be parsed.
    #[error("Invalid length '{0}'")]
    InvalidLength(String),

    /// An operation collapsed its input (zero area, empty union, ...).
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A kernel operation returned a different geometry kind than required.
    #[error("Unexpected geometry: expected {expected}, found {found}")]
    UnexpectedGeometry {
        /// The kind the caller required.
        expected: &'static str,
        /// The kind actually produced.
        found: String,
    },

    /// One or more seam-allowance shapes do not fit on an empty page.
    #[error("{} piece(s) cannot be placed on the page (groups {groups:?})", .groups.len())]
    UnplaceablePieces {
        /// Every group index that failed, in processing order.
        groups: Vec<usize>,
    },

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for pattern operations.
pub type Result<T> = std::result::Result<T, Error>;
