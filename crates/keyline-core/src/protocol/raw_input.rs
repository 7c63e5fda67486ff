//! Decoder for Windows `RAWINPUT` payloads.
//!
//! The OS hands the capture window an opaque buffer that is copied out with
//! `GetRawInputData`.  This module validates and interprets that buffer so the
//! capture callback never touches it through pointer casts.
//!
//! Layout (64-bit process, all integers little-endian):
//! ```text
//! RAWINPUTHEADER  [dwType:4][dwSize:4][hDevice:8][wParam:8]                 24 bytes
//! RAWMOUSE        [usFlags:2][pad:2][usButtonFlags:2][usButtonData:2]
//!                 [ulRawButtons:4][lLastX:4][lLastY:4][ulExtraInformation:4] 24 bytes
//! RAWKEYBOARD     [MakeCode:2][Flags:2][Reserved:2][VKey:2]
//!                 [Message:4][ExtraInformation:4]                          16 bytes
//! ```
//!
//! Anything empty, larger than [`MAX_PAYLOAD_SIZE`], or shorter than its
//! declared structure is rejected.  Callers treat every error as capture noise
//! and drop the event.

use thiserror::Error;

/// Size of `RAWINPUTHEADER`.
pub const HEADER_SIZE: usize = 24;
/// Size of `RAWMOUSE`.
pub const MOUSE_SIZE: usize = 24;
/// Size of `RAWKEYBOARD`.
pub const KEYBOARD_SIZE: usize = 16;
/// Largest payload the capture callback will copy.
pub const MAX_PAYLOAD_SIZE: usize = 8 * 1024;

/// `dwType` values.
pub const RIM_TYPEMOUSE: u32 = 0;
pub const RIM_TYPEKEYBOARD: u32 = 1;
pub const RIM_TYPEHID: u32 = 2;

/// `RAWKEYBOARD::Flags` bit set on key release.
pub const RI_KEY_BREAK: u16 = 0x0001;

/// `RAWMOUSE::usButtonFlags` bits.
pub const RI_MOUSE_BUTTON_1_DOWN: u16 = 0x0001;
pub const RI_MOUSE_BUTTON_1_UP: u16 = 0x0002;
pub const RI_MOUSE_BUTTON_2_DOWN: u16 = 0x0004;
pub const RI_MOUSE_BUTTON_2_UP: u16 = 0x0008;
pub const RI_MOUSE_BUTTON_3_DOWN: u16 = 0x0010;
pub const RI_MOUSE_BUTTON_3_UP: u16 = 0x0020;

/// Reasons a payload is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RawInputError {
    #[error("empty raw input payload")]
    Empty,

    #[error("raw input payload of {size} bytes exceeds the {max}-byte limit")]
    Oversized { size: usize, max: usize },

    #[error("truncated raw input: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    #[error("unknown raw input device type: {0}")]
    UnknownType(u32),
}

/// Mouse buttons tracked by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Button 1 (usually left).  Only this one produces click events.
    Primary,
    /// Button 2 (usually right).
    Secondary,
    /// Button 3 (usually middle).
    Middle,
}

/// Decoded `RAWKEYBOARD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardReport {
    pub make_code: u16,
    pub flags: u16,
    pub vkey: u16,
}

impl KeyboardReport {
    /// `true` for a key release.
    pub fn is_break(&self) -> bool {
        self.flags & RI_KEY_BREAK != 0
    }
}

/// Decoded `RAWMOUSE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseReport {
    pub flags: u16,
    pub button_flags: u16,
    pub button_data: u16,
    pub last_x: i32,
    pub last_y: i32,
}

impl MouseReport {
    /// Button transitions carried by this report, as `(button, pressed)`.
    ///
    /// A single report may carry several transitions; they are yielded in
    /// bit order.
    pub fn button_transitions(&self) -> impl Iterator<Item = (MouseButton, bool)> + '_ {
        const BITS: [(u16, MouseButton, bool); 6] = [
            (RI_MOUSE_BUTTON_1_DOWN, MouseButton::Primary, true),
            (RI_MOUSE_BUTTON_1_UP, MouseButton::Primary, false),
            (RI_MOUSE_BUTTON_2_DOWN, MouseButton::Secondary, true),
            (RI_MOUSE_BUTTON_2_UP, MouseButton::Secondary, false),
            (RI_MOUSE_BUTTON_3_DOWN, MouseButton::Middle, true),
            (RI_MOUSE_BUTTON_3_UP, MouseButton::Middle, false),
        ];
        BITS.into_iter()
            .filter(move |(bit, _, _)| self.button_flags & bit != 0)
            .map(|(_, button, pressed)| (button, pressed))
    }
}

/// A decoded raw input payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    /// Some other HID device; carried through but never interpreted.
    Hid,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one raw input payload.
///
/// # Errors
///
/// Returns [`RawInputError`] when the buffer is empty, too large, shorter than
/// the structure its header declares, or of an unknown device type.
pub fn decode_raw_input(bytes: &[u8]) -> Result<RawInput, RawInputError> {
    if bytes.is_empty() {
        return Err(RawInputError::Empty);
    }
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(RawInputError::Oversized {
            size: bytes.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    require(bytes, HEADER_SIZE)?;

    let dw_type = read_u32(bytes, 0);
    let dw_size = read_u32(bytes, 4) as usize;
    require(bytes, dw_size)?;

    match dw_type {
        RIM_TYPEMOUSE => {
            require(bytes, HEADER_SIZE + MOUSE_SIZE)?;
            let b = &bytes[HEADER_SIZE..];
            Ok(RawInput::Mouse(MouseReport {
                flags: read_u16(b, 0),
                button_flags: read_u16(b, 4),
                button_data: read_u16(b, 6),
                last_x: read_i32(b, 12),
                last_y: read_i32(b, 16),
            }))
        }
        RIM_TYPEKEYBOARD => {
            require(bytes, HEADER_SIZE + KEYBOARD_SIZE)?;
            let b = &bytes[HEADER_SIZE..];
            Ok(RawInput::Keyboard(KeyboardReport {
                make_code: read_u16(b, 0),
                flags: read_u16(b, 2),
                vkey: read_u16(b, 6),
            }))
        }
        RIM_TYPEHID => Ok(RawInput::Hid),
        other => Err(RawInputError::UnknownType(other)),
    }
}

/// Encodes a report in the same layout [`decode_raw_input`] reads.
///
/// Used by the mock capture source and by tests to produce realistic payloads.
pub fn encode_raw_input(input: &RawInput) -> Vec<u8> {
    let (dw_type, body) = match input {
        RawInput::Mouse(m) => {
            let mut b = Vec::with_capacity(MOUSE_SIZE);
            b.extend_from_slice(&m.flags.to_le_bytes());
            b.extend_from_slice(&0u16.to_le_bytes());
            b.extend_from_slice(&m.button_flags.to_le_bytes());
            b.extend_from_slice(&m.button_data.to_le_bytes());
            b.extend_from_slice(&0u32.to_le_bytes());
            b.extend_from_slice(&m.last_x.to_le_bytes());
            b.extend_from_slice(&m.last_y.to_le_bytes());
            b.extend_from_slice(&0u32.to_le_bytes());
            (RIM_TYPEMOUSE, b)
        }
        RawInput::Keyboard(k) => {
            let mut b = Vec::with_capacity(KEYBOARD_SIZE);
            b.extend_from_slice(&k.make_code.to_le_bytes());
            b.extend_from_slice(&k.flags.to_le_bytes());
            b.extend_from_slice(&0u16.to_le_bytes());
            b.extend_from_slice(&k.vkey.to_le_bytes());
            let message: u32 = if k.is_break() { 0x0101 } else { 0x0100 };
            b.extend_from_slice(&message.to_le_bytes());
            b.extend_from_slice(&0u32.to_le_bytes());
            (RIM_TYPEKEYBOARD, b)
        }
        RawInput::Hid => (RIM_TYPEHID, Vec::new()),
    };

    let total = (HEADER_SIZE + body.len()) as u32;
    let mut buf = Vec::with_capacity(total as usize);
    buf.extend_from_slice(&dw_type.to_le_bytes());
    buf.extend_from_slice(&total.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes()); // hDevice
    buf.extend_from_slice(&0u64.to_le_bytes()); // wParam
    buf.extend_from_slice(&body);
    buf
}

/// Convenience constructor for a keyboard transition.
pub fn keyboard(vkey: u16, pressed: bool) -> RawInput {
    RawInput::Keyboard(KeyboardReport {
        make_code: 0,
        flags: if pressed { 0 } else { RI_KEY_BREAK },
        vkey,
    })
}

/// Convenience constructor for a mouse report.
pub fn mouse(button_flags: u16, last_x: i32, last_y: i32) -> RawInput {
    RawInput::Mouse(MouseReport {
        button_flags,
        last_x,
        last_y,
        ..MouseReport::default()
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn require(bytes: &[u8], needed: usize) -> Result<(), RawInputError> {
    if bytes.len() < needed {
        return Err(RawInputError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

fn read_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn read_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn read_i32(b: &[u8], at: usize) -> i32 {
    read_u32(b, at) as i32
}
