//! Domain entities for the input timeline overlay.
//!
//! Pure logic with no OS, graphics, or file-system dependencies.  Everything
//! here can be unit-tested on any platform.
//!
//! - **`row`**      – the four monitored rows and the key bound to each.
//! - **`clock`**    – millisecond clocks shared by capture and rendering.
//! - **`timeline`** – segments, clicks, the last-key cursor, and eviction.
//! - **`window`**   – the moving five-second window and timestamp mapping.
//! - **`layout`**   – packing of enabled rows and overlay padding.
//! - **`color`**    – conversion from host colour integers to RGBA.
//! - **`settings`** – the complete settings table with defaults.

pub mod clock;
pub mod color;
pub mod layout;
pub mod row;
pub mod settings;
pub mod timeline;
pub mod window;
