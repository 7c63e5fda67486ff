//! Overlay settings: size, background, and per-row key/colour/visibility.
//!
//! Every field has a serde default so a partial settings table (or an empty
//! one on first run) still produces a complete, usable configuration.
//! Colours use the host's `0x00BBGGRR` integer layout.

use serde::{Deserialize, Serialize};

use super::color::{bgr, Rgba};
use super::layout::RowLayout;
use super::row::{Row, RowBindings, ROW_COUNT};

/// Smallest accepted width or height.
pub const MIN_DIMENSION: u32 = 16;
/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 16_384;

/// Display language for labels in the settings schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "ko-KR")]
    KoKr,
}

/// Settings for one monitored row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowSettings {
    /// Windows Virtual Key code bound to the row.
    pub key: u16,
    /// Row colour as `0x00BBGGRR`.
    pub color: u32,
    /// Whether the row is drawn.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Complete overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(default = "default_width")]
    pub width: u32,
    /// Configured height; also the basis for row slot height.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Background opacity in `[0, 1]`.
    #[serde(default = "default_bg_alpha")]
    pub bg_alpha: f32,
    /// Background colour as `0x00BBGGRR`.
    #[serde(default)]
    pub bg_color: u32,
    /// Report a height that shrinks with the number of enabled rows.
    #[serde(default = "default_true")]
    pub dynamic_height: bool,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_rows")]
    pub rows: [RowSettings; ROW_COUNT],
}

fn default_true() -> bool {
    true
}
fn default_width() -> u32 {
    1500
}
fn default_height() -> u32 {
    520
}
fn default_bg_alpha() -> f32 {
    0.55
}

/// Default row colours: #f3c85d, #9cff9c, #cf3f3f, #0aa0c8.
pub const DEFAULT_ROW_COLORS: [u32; ROW_COUNT] = [
    bgr(0xf3, 0xc8, 0x5d),
    bgr(0x9c, 0xff, 0x9c),
    bgr(0xcf, 0x3f, 0x3f),
    bgr(0x0a, 0xa0, 0xc8),
];

fn default_rows() -> [RowSettings; ROW_COUNT] {
    let keys = RowBindings::DEFAULT_KEYS;
    Row::ALL.map(|row| RowSettings {
        key: keys[row.index()],
        color: DEFAULT_ROW_COLORS[row.index()],
        enabled: true,
    })
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            bg_alpha: default_bg_alpha(),
            bg_color: 0,
            dynamic_height: true,
            locale: Locale::default(),
            rows: default_rows(),
        }
    }
}

impl OverlaySettings {
    /// Forces every field into its valid range.
    ///
    /// Zero dimensions and zero key codes fall back to defaults; other
    /// dimensions are clamped to `MIN_DIMENSION..=MAX_DIMENSION`.
    pub fn sanitize(&mut self) {
        let fix_dim = |v: u32, default: u32| {
            if v == 0 {
                default
            } else {
                v.clamp(MIN_DIMENSION, MAX_DIMENSION)
            }
        };
        self.width = fix_dim(self.width, default_width());
        self.height = fix_dim(self.height, default_height());
        self.bg_alpha = if self.bg_alpha.is_nan() {
            default_bg_alpha()
        } else {
            self.bg_alpha.clamp(0.0, 1.0)
        };
        for (row, settings) in Row::ALL.iter().zip(self.rows.iter_mut()) {
            if settings.key == 0 {
                settings.key = RowBindings::DEFAULT_KEYS[row.index()];
            }
        }
    }

    /// Row-to-key mapping used by the capture context.
    pub fn bindings(&self) -> RowBindings {
        RowBindings::new(self.rows.map(|r| r.key))
    }

    /// Enabled flag per row.
    pub fn enabled(&self) -> [bool; ROW_COUNT] {
        self.rows.map(|r| r.enabled)
    }

    pub fn row(&self, row: Row) -> &RowSettings {
        &self.rows[row.index()]
    }

    pub fn row_mut(&mut self, row: Row) -> &mut RowSettings {
        &mut self.rows[row.index()]
    }

    pub fn row_color(&self, row: Row, alpha: f32) -> Rgba {
        Rgba::from_bgr(self.row(row).color, alpha)
    }

    pub fn background(&self) -> Rgba {
        Rgba::from_bgr(self.bg_color, self.bg_alpha)
    }

    /// Row packing for the current enabled flags.
    pub fn row_layout(&self) -> RowLayout {
        RowLayout::compute(self.height as f32, self.enabled())
    }

    /// Height reported to the host.
    ///
    /// With dynamic sizing this is the height of the enabled rows plus
    /// padding; otherwise the configured height.
    pub fn output_height(&self) -> u32 {
        if self.dynamic_height {
            self.row_layout().visible_height().max(0.0).round() as u32
        } else {
            self.height
        }
    }
}
