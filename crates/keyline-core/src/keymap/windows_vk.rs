//! Windows Virtual Key (VK) codes for the keys a row can be bound to.
//!
//! Raw keyboard input reports the `VKey` field of `RAWKEYBOARD`, so rows are
//! bound to VK codes directly.  Letters and digits use their ASCII value
//! (`VK_A = 0x41`, `VK_0 = 0x30`).
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes

pub const VK_TAB: u16 = 0x09;
pub const VK_RETURN: u16 = 0x0D;
pub const VK_SHIFT: u16 = 0x10;
pub const VK_CONTROL: u16 = 0x11;
pub const VK_MENU: u16 = 0x12;
pub const VK_ESCAPE: u16 = 0x1B;
pub const VK_SPACE: u16 = 0x20;
pub const VK_LEFT: u16 = 0x25;
pub const VK_UP: u16 = 0x26;
pub const VK_RIGHT: u16 = 0x27;
pub const VK_DOWN: u16 = 0x28;

pub const VK_0: u16 = 0x30;
pub const VK_9: u16 = 0x39;

pub const VK_A: u16 = 0x41;
pub const VK_D: u16 = 0x44;
pub const VK_S: u16 = 0x53;
pub const VK_W: u16 = 0x57;
pub const VK_Z: u16 = 0x5A;

pub const VK_F1: u16 = 0x70;
pub const VK_F12: u16 = 0x7B;

/// Returns the VK code for an ASCII letter or digit.
///
/// Lower-case letters map to the same code as upper-case.
pub const fn vk_for_char(ch: char) -> Option<u16> {
    match ch {
        'A'..='Z' | '0'..='9' => Some(ch as u16),
        'a'..='z' => Some(ch as u16 - 0x20),
        _ => None,
    }
}

/// Returns the VK code for function key `F<n>` (1..=12).
pub const fn vk_for_function_key(n: u8) -> Option<u16> {
    if n >= 1 && n <= 12 {
        Some(VK_F1 + (n as u16 - 1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits_use_ascii_codes() {
        assert_eq!(vk_for_char('W'), Some(VK_W));
        assert_eq!(vk_for_char('w'), Some(VK_W));
        assert_eq!(vk_for_char('0'), Some(VK_0));
        assert_eq!(vk_for_char('9'), Some(VK_9));
        assert_eq!(vk_for_char('-'), None);
    }

    #[test]
    fn test_function_keys_are_contiguous() {
        assert_eq!(vk_for_function_key(1), Some(VK_F1));
        assert_eq!(vk_for_function_key(12), Some(VK_F12));
        assert_eq!(vk_for_function_key(0), None);
        assert_eq!(vk_for_function_key(13), None);
    }
}
