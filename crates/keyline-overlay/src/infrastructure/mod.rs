//! Infrastructure layer for the overlay.
//!
//! Contains OS-facing adapters: raw input capture, file-system storage, and
//! the host bridge (settings table, property schema, source lifecycle).
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keyline_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod host;
pub mod input_capture;
pub mod storage;
