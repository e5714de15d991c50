//! Pipeline configuration.

use crate::transform::AABB2D;
use crate::units::parse_length;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerances, page geometry and unit conversion for one pipeline run.
///
/// Lengths suffixed `_in` are physical inches; everything else is in
/// diagram units. `units_per_inch` converts between the two.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Grid resolution used to snap segment endpoints.
    pub snap_tolerance: f64,

    /// Faces smaller than this area are discarded.
    pub min_area: f64,

    /// Cross-product threshold for dropping collinear vertices.
    pub collinear_tolerance: f64,

    /// Relative hull/shape area excess above which a union counts as concave.
    pub concave_tolerance: f64,

    /// Vertex match tolerance for shared-edge detection during grouping.
    pub edge_tolerance: f64,

    /// Perpendicular distance for seam/outline and seam/edge collinearity.
    pub seam_order_tolerance: f64,

    /// Maximum classification rounds for seam orders.
    pub max_seam_rounds: u32,

    /// Seam allowance width in inches.
    pub allowance_in: f64,

    /// Diagram units per physical inch.
    pub units_per_inch: f64,

    /// Page width in inches.
    pub page_width_in: f64,

    /// Page height in inches.
    pub page_height_in: f64,

    /// Blank border kept on every page edge, in inches.
    pub margin_in: f64,

    /// Minimum gap between placed pieces, in inches.
    pub spacing_in: f64,

    /// Whether the nester may rotate pieces.
    pub allow_rotation: bool,

    /// Erosion applied before containment tests, in diagram units.
    pub fit_tolerance: f64,

    /// Step of the bounding-box rotation search, in degrees.
    pub rotation_step_deg: f64,

    /// Mitre length limit (multiples of the offset distance) before bevelling.
    pub mitre_limit: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snap_tolerance: 1e-3,
            min_area: 0.1,
            collinear_tolerance: 1e-2,
            concave_tolerance: 1e-2,
            edge_tolerance: 1e-2,
            seam_order_tolerance: 10.0,
            max_seam_rounds: 10,
            allowance_in: 0.25,
            units_per_inch: 96.0,
            page_width_in: 8.5,
            page_height_in: 11.0,
            margin_in: 0.5,
            spacing_in: 0.1,
            allow_rotation: true,
            fit_tolerance: 1e-6,
            rotation_step_deg: 5.0,
            mitre_limit: 5.0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint snapping resolution.
    pub fn with_snap_tolerance(mut self, tol: f64) -> Self {
        self.snap_tolerance = tol;
        self
    }

    /// Sets the minimum face area.
    pub fn with_min_area(mut self, area: f64) -> Self {
        self.min_area = area;
        self
    }

    /// Sets the collinearity tolerance.
    pub fn with_collinear_tolerance(mut self, tol: f64) -> Self {
        self.collinear_tolerance = tol;
        self
    }

    /// Sets the concavity tolerance used while growing groups.
    pub fn with_concave_tolerance(mut self, tol: f64) -> Self {
        self.concave_tolerance = tol;
        self
    }

    /// Sets the shared-edge vertex tolerance.
    pub fn with_edge_tolerance(mut self, tol: f64) -> Self {
        self.edge_tolerance = tol;
        self
    }

    /// Sets the seam-order collinearity tolerance.
    pub fn with_seam_order_tolerance(mut self, tol: f64) -> Self {
        self.seam_order_tolerance = tol;
        self
    }

    /// Sets the seam classification round cap.
    pub fn with_max_seam_rounds(mut self, rounds: u32) -> Self {
        self.max_seam_rounds = rounds;
        self
    }

    /// Sets the seam allowance in inches.
    pub fn with_allowance(mut self, inches: f64) -> Self {
        self.allowance_in = inches;
        self
    }

    /// Sets the seam allowance from a length string such as `"6mm"`.
    pub fn with_allowance_str(mut self, text: &str) -> Result<Self> {
        self.allowance_in = parse_length(text)?;
        Ok(self)
    }

    /// Sets the diagram-unit scale.
    pub fn with_units_per_inch(mut self, units: f64) -> Self {
        self.units_per_inch = units;
        self
    }

    /// Sets the page size in inches.
    pub fn with_page_size(mut self, width_in: f64, height_in: f64) -> Self {
        self.page_width_in = width_in;
        self.page_height_in = height_in;
        self
    }

    /// Sets the page size from length strings such as `"210mm"`, `"297mm"`.
    pub fn with_page_size_str(mut self, width: &str, height: &str) -> Result<Self> {
        self.page_width_in = parse_length(width)?;
        self.page_height_in = parse_length(height)?;
        Ok(self)
    }

    /// Sets the page margin in inches.
    pub fn with_margin(mut self, inches: f64) -> Self {
        self.margin_in = inches;
        self
    }

    /// Sets the inter-piece spacing in inches.
    pub fn with_spacing(mut self, inches: f64) -> Self {
        self.spacing_in = inches;
        self
    }

    /// Enables or disables rotation during nesting.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Sets the containment erosion tolerance.
    pub fn with_fit_tolerance(mut self, tol: f64) -> Self {
        self.fit_tolerance = tol;
        self
    }

    /// Sets the pre-rotation search step in degrees.
    pub fn with_rotation_step(mut self, degrees: f64) -> Self {
        self.rotation_step_deg = degrees;
        self
    }

    /// Sets the mitre limit for seam-allowance corners.
    pub fn with_mitre_limit(mut self, limit: f64) -> Self {
        self.mitre_limit = limit;
        self
    }

    /// Seam allowance in diagram units.
    pub fn allowance_units(&self) -> f64 {
        self.allowance_in * self.units_per_inch
    }

    /// Inter-piece spacing in diagram units.
    pub fn spacing_units(&self) -> f64 {
        self.spacing_in * self.units_per_inch
    }

    /// Page margin in diagram units.
    pub fn margin_units(&self) -> f64 {
        self.margin_in * self.units_per_inch
    }

    /// Page width in diagram units.
    pub fn page_width_units(&self) -> f64 {
        self.page_width_in * self.units_per_inch
    }

    /// Page height in diagram units.
    pub fn page_height_units(&self) -> f64 {
        self.page_height_in * self.units_per_inch
    }

    /// The printable rectangle of a page in diagram units.
    pub fn printable_area(&self) -> AABB2D {
        let m = self.margin_units();
        AABB2D::new(
            m,
            m,
            self.page_width_units() - m,
            self.page_height_units() - m,
        )
    }

    /// Checks every value for range errors.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("snap_tolerance", self.snap_tolerance),
            ("min_area", self.min_area),
            ("collinear_tolerance", self.collinear_tolerance),
            ("concave_tolerance", self.concave_tolerance),
            ("edge_tolerance", self.edge_tolerance),
            ("seam_order_tolerance", self.seam_order_tolerance),
            ("allowance_in", self.allowance_in),
            ("margin_in", self.margin_in),
            ("spacing_in", self.spacing_in),
            ("fit_tolerance", self.fit_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let positive = [
            ("units_per_inch", self.units_per_inch),
            ("page_width_in", self.page_width_in),
            ("page_height_in", self.page_height_in),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let step = self.rotation_step_deg;
        if step.is_nan() || step <= 0.0 || step >= 180.0 {
            return Err(Error::InvalidConfig(format!(
                "rotation_step_deg must be in (0, 180), got {}",
                self.rotation_step_deg
            )));
        }

        if self.mitre_limit.is_nan() || self.mitre_limit < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "mitre_limit must be at least 1, got {}",
                self.mitre_limit
            )));
        }

        let printable = self.printable_area();
        if printable.width() <= 0.0 || printable.height() <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "margin {}in leaves no printable area on a {}x{}in page",
                self.margin_in, self.page_width_in, self.page_height_in
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_units_per_inch(1.0)
            .with_page_size(8.5, 11.0)
            .with_margin(0.25)
            .with_spacing(0.1)
            .with_rotation(false);

        assert_eq!(config.units_per_inch, 1.0);
        assert_eq!(config.margin_in, 0.25);
        assert!(!config.allow_rotation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_units() {
        let config = Config::default();
        assert_relative_eq!(config.allowance_units(), 24.0);
        assert_relative_eq!(config.margin_units(), 48.0);
        assert_relative_eq!(config.spacing_units(), 9.6, epsilon = 1e-12);

        let area = config.printable_area();
        assert_relative_eq!(area.min_x, 48.0);
        assert_relative_eq!(area.min_y, 48.0);
        assert_relative_eq!(area.max_x, 8.5 * 96.0 - 48.0);
        assert_relative_eq!(area.max_y, 11.0 * 96.0 - 48.0);
    }

    #[test]
    fn test_length_strings() {
        let config = Config::new()
            .with_page_size_str("210mm", "297mm")
            .and_then(|c| c.with_allowance_str("6.35mm"))
            .unwrap();
        assert_relative_eq!(config.page_width_in, 210.0 / 25.4);
        assert_relative_eq!(config.allowance_in, 0.25, epsilon = 1e-12);

        assert!(matches!(
            Config::new().with_allowance_str("quarter"),
            Err(Error::InvalidLength(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::new().with_page_size(0.0, 11.0).validate().is_err());
        assert!(Config::new().with_units_per_inch(-1.0).validate().is_err());
        assert!(Config::new().with_allowance(-0.1).validate().is_err());
        assert!(Config::new().with_rotation_step(0.0).validate().is_err());
        assert!(Config::new().with_rotation_step(180.0).validate().is_err());
        assert!(Config::new().with_margin(5.0).validate().is_err());
        assert!(Config::new().with_snap_tolerance(f64::NAN).validate().is_err());
    }
}
