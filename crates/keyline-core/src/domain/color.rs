//! Colour values handed to the drawing primitive.
//!
//! Host colour pickers store colours as Windows `COLORREF` integers laid out
//! as `0x00BBGGRR`.  Drawing wants normalized RGBA floats.

use serde::{Deserialize, Serialize};

/// Straight RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    /// Grid, axis, and tick colour (#292929).
    pub const GRID: Rgba = Rgba::new(0.160_784, 0.160_784, 0.160_784, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts a `0x00BBGGRR` colour with the given alpha.
    pub fn from_bgr(bgr: u32, alpha: f32) -> Self {
        let channel = |shift: u32| ((bgr >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(0), channel(8), channel(16), alpha)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Builds a `0x00BBGGRR` value from ordinary RGB bytes.
pub const fn bgr(r: u8, g: u8, b: u8) -> u32 {
    (b as u32) << 16 | (g as u32) << 8 | r as u32
}
