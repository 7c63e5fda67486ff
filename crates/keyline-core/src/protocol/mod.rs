//! Wire formats the overlay has to read.
//!
//! Only one today: the `RAWINPUT` buffers the OS delivers to the capture
//! window.

pub mod raw_input;

pub use raw_input::{
    decode_raw_input, encode_raw_input, KeyboardReport, MouseButton, MouseReport, RawInput,
    RawInputError,
};
