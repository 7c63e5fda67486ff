//! # keyline-core
//!
//! Platform-independent core of the Keyline input timeline overlay.
//!
//! The overlay shows, for the last five seconds, when each of four monitored
//! keys was held and where primary mouse clicks happened relative to the most
//! recent key press.  This crate holds everything that does not need an OS
//! handle or a graphics device, so it builds and tests on any platform.
//!
//! - **`domain`** – rows and key bindings, the timeline of segments and
//!   clicks, the moving time window, row layout, colours, and settings.
//!
//! - **`protocol`** – decoding of the `RAWINPUT` buffers delivered by the OS
//!   into typed keyboard and mouse reports.
//!
//! - **`keymap`** – Windows virtual key codes, the list of bindable keys, and
//!   the short labels drawn next to each row.
//!
//! - **`glyph`** – the 5x7 block font used for row labels, tick labels, and
//!   click deltas.

pub mod domain;
pub mod glyph;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `keyline_core::Timeline` instead of `keyline_core::domain::timeline::Timeline`.
pub use domain::clock::{Clock, ManualClock, Millis, MonotonicClock};
pub use domain::color::Rgba;
pub use domain::layout::RowLayout;
pub use domain::row::{Row, RowBindings, RowError, FALLBACK_ROW, ROW_COUNT};
pub use domain::settings::{Locale, OverlaySettings, RowSettings};
pub use domain::timeline::{
    Applied, ClickEvent, KeyCursor, KeySegment, Timeline, TimelineEvent, RETENTION_MS,
};
pub use domain::window::{TimeWindow, TICK_MS, WINDOW_MS};
pub use protocol::raw_input::{decode_raw_input, MouseButton, RawInput, RawInputError};
