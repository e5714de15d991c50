//! Display colors for groups.
//!
//! Colors are a pure function of `(count, pastel, seed)`: hues are spread
//! evenly around the wheel, shuffled with a seeded generator and converted
//! from HSV.

use rand::prelude::*;
use rand::rngs::StdRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Converts HSV (all components in `[0, 1]`) to RGB.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        if s <= 0.0 {
            return Self { r: v, g: v, b: v };
        }
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self { r, g, b }
    }

    /// `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", channel(self.r), channel(self.g), channel(self.b))
    }
}

/// Generates `n` visually distinct colors.
///
/// Pastel colors use saturation 0.5 and value 0.85; vivid ones 0.85 and 0.9.
pub fn distinct_colors(n: usize, pastel: bool, seed: u64) -> Vec<Rgb> {
    let mut hues: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    hues.shuffle(&mut rng);

    let (s, v) = if pastel { (0.5, 0.85) } else { (0.85, 0.9) };
    hues.into_iter().map(|h| Rgb::from_hsv(h, s, v)).collect()
}
