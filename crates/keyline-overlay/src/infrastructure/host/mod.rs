//! Host bridge: what the embedding application sees of the overlay.
//!
//! - **`settings`** – the host's flat key/value settings store and the
//!   mapping between it and [`keyline_core::OverlaySettings`].
//! - **`schema`**   – the settings property descriptors shown in the host UI.
//! - **`source`**   – [`source::OverlaySource`], the per-instance lifecycle
//!   object the host creates, updates, renders and destroys.

pub mod schema;
pub mod settings;
pub mod source;

pub use schema::{settings_schema, PropertyDescriptor, PropertyKind};
pub use settings::{apply_host, HostSettings, MapSettings};
pub use source::OverlaySource;
