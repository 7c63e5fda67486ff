//! Application layer use cases for the overlay.
//!
//! Use cases here orchestrate `keyline_core` domain objects and depend only
//! on abstractions: no OS calls, no file system access.
//!
//! # Sub-modules
//!
//! - **`record_input`**    – runs in the capture context.  Turns raw input
//!   payloads into [`keyline_core::TimelineEvent`]s and queues them without
//!   ever blocking the OS callback.  Runs on every keystroke and mouse report.
//!
//! - **`render_timeline`** – runs in the render context.  Draws one frame of
//!   the timeline as filled rectangles and curates expired history.

pub mod record_input;
pub mod render_timeline;
