//! Physical length parsing.
//!
//! Page sizes and allowances are usually written with a unit suffix
//! (`"8.5in"`, `"6mm"`). A bare number is a CSS pixel, 1/96 inch.

use crate::{Error, Result};

/// CSS pixels per inch.
pub const PX_PER_INCH: f64 = 96.0;

/// Parses a length string and returns the value in inches.
///
/// Supported suffixes: `in`, `mm`, `cm`, `pt`, `pc`, `px`, or none (pixels).
///
/// ```rust
/// use fpp_core::units::parse_length;
///
/// assert_eq!(parse_length("2in").unwrap(), 2.0);
/// assert!((parse_length("25.4mm").unwrap() - 1.0).abs() < 1e-12);
/// assert!(parse_length("5%").is_err());
/// ```
pub fn parse_length(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| Error::InvalidLength(text.to_string()))?;
    if !value.is_finite() {
        return Err(Error::InvalidLength(text.to_string()));
    }

    let per_inch = match unit.trim() {
        "in" => 1.0,
        "mm" => 25.4,
        "cm" => 2.54,
        "pt" => 72.0,
        "pc" => 6.0,
        "px" | "" => PX_PER_INCH,
        _ => return Err(Error::InvalidLength(text.to_string())),
    };

    Ok(value / per_inch)
}
