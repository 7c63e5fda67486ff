//! Monitored rows and the row-to-key mapping.
//!
//! The overlay tracks exactly [`ROW_COUNT`] rows.  Each row is bound to one
//! physical key (a Windows Virtual Key code) and drawn as a horizontal lane.
//! Historically the rows were W/S/A/D, which is why the default bindings and
//! the named row constants use those letters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::windows_vk;

/// Number of monitored rows.
pub const ROW_COUNT: usize = 4;

/// Row that a click is attributed to when no key has ever been pressed.
pub const FALLBACK_ROW: Row = Row::D;

/// Errors produced when constructing a [`Row`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    /// The index is not in `0..ROW_COUNT`.
    #[error("row index {0} out of range (expected 0..{ROW_COUNT})")]
    OutOfRange(usize),
}

/// Index of one monitored row, guaranteed to be in `0..ROW_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Row(u8);

impl Row {
    /// First row (default key W).
    pub const W: Row = Row(0);
    /// Second row (default key S).
    pub const S: Row = Row(1);
    /// Third row (default key A).
    pub const A: Row = Row(2);
    /// Fourth row (default key D).
    pub const D: Row = Row(3);

    /// All rows in top-to-bottom order.
    pub const ALL: [Row; ROW_COUNT] = [Row::W, Row::S, Row::A, Row::D];

    /// Creates a row from an index.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::OutOfRange`] when `index >= ROW_COUNT`.
    pub fn new(index: usize) -> Result<Self, RowError> {
        if index < ROW_COUNT {
            Ok(Row(index as u8))
        } else {
            Err(RowError::OutOfRange(index))
        }
    }

    /// Returns the zero-based index of the row.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for Row {
    type Error = RowError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Row::new(index)
    }
}

impl From<Row> for usize {
    fn from(row: Row) -> usize {
        row.index()
    }
}

/// Key codes bound to each row, indexed by [`Row::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBindings {
    keys: [u16; ROW_COUNT],
}

impl RowBindings {
    /// Default bindings: W, S, A, D.
    pub const DEFAULT_KEYS: [u16; ROW_COUNT] = [
        windows_vk::VK_W,
        windows_vk::VK_S,
        windows_vk::VK_A,
        windows_vk::VK_D,
    ];

    /// Creates bindings from an explicit key array.
    pub fn new(keys: [u16; ROW_COUNT]) -> Self {
        Self { keys }
    }

    /// Resolves a physical key code to its row.
    ///
    /// When several rows are bound to the same key the first one wins.
    /// Returns `None` for keys that are not bound to any row.
    pub fn row_for_key(&self, key: u16) -> Option<Row> {
        self.keys
            .iter()
            .position(|&k| k == key)
            .map(|i| Row(i as u8))
    }

    /// Returns the key bound to `row`.
    pub fn key(&self, row: Row) -> u16 {
        self.keys[row.index()]
    }

    /// Rebinds `row` to `key`.
    pub fn set_key(&mut self, row: Row, key: u16) {
        self.keys[row.index()] = key;
    }

    /// Returns all bound keys in row order.
    pub fn keys(&self) -> [u16; ROW_COUNT] {
        self.keys
    }
}

impl Default for RowBindings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_new_accepts_valid_indices() {
        for i in 0..ROW_COUNT {
            assert_eq!(Row::new(i).unwrap().index(), i);
        }
    }

    #[test]
    fn test_row_new_rejects_out_of_range_index() {
        assert_eq!(Row::new(4), Err(RowError::OutOfRange(4)));
        assert_eq!(Row::new(usize::MAX), Err(RowError::OutOfRange(usize::MAX)));
    }

    #[test]
    fn test_default_bindings_resolve_wsad() {
        let bindings = RowBindings::default();

        assert_eq!(bindings.row_for_key(windows_vk::VK_W), Some(Row::W));
        assert_eq!(bindings.row_for_key(windows_vk::VK_S), Some(Row::S));
        assert_eq!(bindings.row_for_key(windows_vk::VK_A), Some(Row::A));
        assert_eq!(bindings.row_for_key(windows_vk::VK_D), Some(Row::D));
    }

    #[test]
    fn test_unbound_key_resolves_to_none() {
        let bindings = RowBindings::default();
        assert_eq!(bindings.row_for_key(windows_vk::VK_SPACE), None);
    }

    #[test]
    fn test_duplicate_binding_first_row_wins() {
        // Arrange: rows S and D both bound to Space
        let mut bindings = RowBindings::default();
        bindings.set_key(Row::S, windows_vk::VK_SPACE);
        bindings.set_key(Row::D, windows_vk::VK_SPACE);

        // Act / Assert
        assert_eq!(bindings.row_for_key(windows_vk::VK_SPACE), Some(Row::S));
    }

    #[test]
    fn test_row_deserialize_rejects_out_of_range() {
        #[derive(Deserialize)]
        struct Wrapper {
            row: Row,
        }

        let ok: Wrapper = toml::from_str("row = 2").expect("valid row");
        assert_eq!(ok.row, Row::A);

        let bad: Result<Wrapper, _> = toml::from_str("row = 7");
        assert!(bad.is_err());
    }
}
