//! The host's flat settings table.
//!
//! Hosts store source settings as a flat string-keyed table with typed
//! getters that return the registered default (or zero) for missing keys.
//! Keys:
//!
//! | key                  | type   | meaning                         |
//! |----------------------|--------|---------------------------------|
//! | `width`, `height`    | int    | overlay size; `<= 0` is ignored |
//! | `bg_alpha`           | double | background opacity              |
//! | `bg_color`           | int    | background colour `0x00BBGGRR`  |
//! | `color_<row>`        | int    | row colour `0x00BBGGRR`         |
//! | `row_<row>_key`      | int    | VK code; `0` means row default  |
//! | `row_<row>_enabled`  | bool   | row visibility                  |
//!
//! where `<row>` is one of `w`, `s`, `a`, `d`.

use std::collections::HashMap;

use keyline_core::{OverlaySettings, Row, RowBindings};

/// Read access to the host's settings table.
pub trait HostSettings {
    fn get_int(&self, key: &str) -> i64;
    fn get_double(&self, key: &str) -> f64;
    fn get_bool(&self, key: &str) -> bool;
}

/// Key suffix for `row`.
pub fn row_suffix(row: Row) -> &'static str {
    ["w", "s", "a", "d"][row.index()]
}

pub fn row_key_id(row: Row) -> String {
    format!("row_{}_key", row_suffix(row))
}

pub fn row_color_id(row: Row) -> String {
    format!("color_{}", row_suffix(row))
}

pub fn row_enabled_id(row: Row) -> String {
    format!("row_{}_enabled", row_suffix(row))
}

/// Reads the host table into `settings`.
///
/// Non-positive dimensions keep the previous value and a zero key code falls
/// back to the row's default key.  The result is sanitised.
pub fn apply_host(settings: &mut OverlaySettings, host: &dyn HostSettings) {
    let dimension = |key: &str| u32::try_from(host.get_int(key)).ok().filter(|v| *v > 0);
    if let Some(width) = dimension("width") {
        settings.width = width;
    }
    if let Some(height) = dimension("height") {
        settings.height = height;
    }

    settings.bg_alpha = host.get_double("bg_alpha") as f32;
    settings.bg_color = host.get_int("bg_color") as u32;

    for row in Row::ALL {
        let key = match u16::try_from(host.get_int(&row_key_id(row))) {
            Ok(vk) if vk != 0 => vk,
            _ => RowBindings::DEFAULT_KEYS[row.index()],
        };
        let color = host.get_int(&row_color_id(row)) as u32;
        let enabled = host.get_bool(&row_enabled_id(row));

        let target = settings.row_mut(row);
        target.key = key;
        target.color = color;
        target.enabled = enabled;
    }

    settings.sanitize();
}

/// A value stored in [`MapSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostValue {
    Int(i64),
    Double(f64),
    Bool(bool),
}

/// In-memory [`HostSettings`] with registered defaults.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, HostValue>,
    defaults: HashMap<String, HostValue>,
}

impl MapSettings {
    /// An empty table with no defaults; every getter returns zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table whose defaults match [`OverlaySettings::default`].
    pub fn with_defaults() -> Self {
        Self {
            values: HashMap::new(),
            defaults: Self::from_settings(&OverlaySettings::default()).values,
        }
    }

    /// A table holding every field of `settings`.
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        let mut table = Self::new();
        table.set_int("width", i64::from(settings.width));
        table.set_int("height", i64::from(settings.height));
        table.set_double("bg_alpha", f64::from(settings.bg_alpha));
        table.set_int("bg_color", i64::from(settings.bg_color));
        for row in Row::ALL {
            let r = settings.row(row);
            table.set_int(&row_key_id(row), i64::from(r.key));
            table.set_int(&row_color_id(row), i64::from(r.color));
            table.set_bool(&row_enabled_id(row), r.enabled);
        }
        table
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), HostValue::Int(value));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), HostValue::Double(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), HostValue::Bool(value));
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn lookup(&self, key: &str) -> Option<HostValue> {
        self.values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .copied()
    }
}

impl HostSettings for MapSettings {
    fn get_int(&self, key: &str) -> i64 {
        match self.lookup(key) {
            Some(HostValue::Int(v)) => v,
            Some(HostValue::Double(v)) => v as i64,
            Some(HostValue::Bool(v)) => i64::from(v),
            None => 0,
        }
    }

    fn get_double(&self, key: &str) -> f64 {
        match self.lookup(key) {
            Some(HostValue::Double(v)) => v,
            Some(HostValue::Int(v)) => v as f64,
            Some(HostValue::Bool(v)) => f64::from(u8::from(v)),
            None => 0.0,
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        match self.lookup(key) {
            Some(HostValue::Bool(v)) => v,
            Some(HostValue::Int(v)) => v != 0,
            Some(HostValue::Double(v)) => v != 0.0,
            None => false,
        }
    }
}
