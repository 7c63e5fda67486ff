//! Vertical layout of the enabled rows and overall overlay geometry.
//!
//! Only enabled rows get a slot.  Slots are packed top-to-bottom starting at
//! [`TOP_PAD`] with [`ROW_GAP`] between them, so disabling a row both hides it
//! and pulls the remaining rows up.  The slot height is derived from the
//! configured height as if all four rows were shown, which keeps rows the same
//! size when others are toggled.

use super::row::{Row, ROW_COUNT};

/// Space above the first row.
pub const TOP_PAD: f32 = 18.0;
/// Space below the last row (holds the time axis and its labels).
pub const BOTTOM_PAD: f32 = 55.0;
/// Vertical gap between row slots.
pub const ROW_GAP: f32 = 20.0;
/// Left edge of the timeline region (row labels live to the left of it).
pub const LEFT_PAD: f32 = 70.0 * 1.3;
/// Space right of the timeline region.
pub const RIGHT_PAD: f32 = 20.0;
/// Horizontal position of row labels.
pub const LABEL_X: f32 = 22.0;
/// Offset of the time axis below the rows area.
pub const AXIS_OFFSET: f32 = 22.0;
/// Thickness of the axis baseline.
pub const AXIS_THICKNESS: f32 = 2.0;

/// Slot height for one row given the configured overlay height.
pub fn base_row_height(height: f32) -> f32 {
    let rows_area = height - TOP_PAD - BOTTOM_PAD;
    let row_h = (rows_area - ROW_GAP * (ROW_COUNT as f32 - 1.0)) / ROW_COUNT as f32;
    row_h.floor().max(0.0)
}

/// Row slot positions for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    /// Height of every slot.
    pub row_height: f32,
    /// Top edge of each row's slot; `None` for disabled rows.
    row_y: [Option<f32>; ROW_COUNT],
    /// Number of enabled rows.
    pub visible_rows: usize,
}

impl RowLayout {
    /// Packs the enabled rows for an overlay of `configured_height`.
    pub fn compute(configured_height: f32, enabled: [bool; ROW_COUNT]) -> Self {
        let row_height = base_row_height(configured_height);
        let mut row_y = [None; ROW_COUNT];
        let mut slot = 0usize;
        for row in Row::ALL {
            if !enabled[row.index()] {
                continue;
            }
            row_y[row.index()] = Some(TOP_PAD + slot as f32 * (row_height + ROW_GAP));
            slot += 1;
        }
        Self {
            row_height,
            row_y,
            visible_rows: slot,
        }
    }

    /// Top of the slot for `row`, or `None` if the row is disabled.
    pub fn row_y(&self, row: Row) -> Option<f32> {
        self.row_y[row.index()]
    }

    /// Enabled rows with their slot tops, in top-to-bottom order.
    pub fn slots(&self) -> impl Iterator<Item = (Row, f32)> + '_ {
        Row::ALL
            .into_iter()
            .filter_map(|row| self.row_y(row).map(|y| (row, y)))
    }

    /// Height actually occupied by the enabled rows plus padding.
    pub fn visible_height(&self) -> f32 {
        if self.visible_rows == 0 {
            return TOP_PAD + BOTTOM_PAD;
        }
        let n = self.visible_rows as f32;
        TOP_PAD + BOTTOM_PAD + n * self.row_height + ROW_GAP * (n - 1.0)
    }
}
