//! Names and labels for the keys a row can be bound to.
//!
//! [`KEY_OPTIONS`] is the list offered by the settings UI.  Row labels drawn
//! on the overlay are abbreviated to at most three characters by
//! [`key_label`].

pub mod windows_vk;

use windows_vk::*;

/// A bindable key: VK code plus display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOption {
    pub vk: u16,
    pub name: &'static str,
}

const fn opt(vk: u16, name: &'static str) -> KeyOption {
    KeyOption { vk, name }
}

/// Keys offered for row binding, in menu order.
pub const KEY_OPTIONS: &[KeyOption] = &[
    opt(0x41, "A"),
    opt(0x42, "B"),
    opt(0x43, "C"),
    opt(0x44, "D"),
    opt(0x45, "E"),
    opt(0x46, "F"),
    opt(0x47, "G"),
    opt(0x48, "H"),
    opt(0x49, "I"),
    opt(0x4A, "J"),
    opt(0x4B, "K"),
    opt(0x4C, "L"),
    opt(0x4D, "M"),
    opt(0x4E, "N"),
    opt(0x4F, "O"),
    opt(0x50, "P"),
    opt(0x51, "Q"),
    opt(0x52, "R"),
    opt(0x53, "S"),
    opt(0x54, "T"),
    opt(0x55, "U"),
    opt(0x56, "V"),
    opt(0x57, "W"),
    opt(0x58, "X"),
    opt(0x59, "Y"),
    opt(0x5A, "Z"),
    opt(0x30, "0"),
    opt(0x31, "1"),
    opt(0x32, "2"),
    opt(0x33, "3"),
    opt(0x34, "4"),
    opt(0x35, "5"),
    opt(0x36, "6"),
    opt(0x37, "7"),
    opt(0x38, "8"),
    opt(0x39, "9"),
    opt(VK_LEFT, "LEFT ARROW"),
    opt(VK_RIGHT, "RIGHT ARROW"),
    opt(VK_UP, "UP ARROW"),
    opt(VK_DOWN, "DOWN ARROW"),
    opt(VK_SPACE, "SPACE"),
    opt(VK_RETURN, "ENTER"),
    opt(VK_TAB, "TAB"),
    opt(VK_ESCAPE, "ESC"),
    opt(VK_SHIFT, "SHIFT"),
    opt(VK_CONTROL, "CTRL"),
    opt(VK_MENU, "ALT"),
    opt(0x70, "F1"),
    opt(0x71, "F2"),
    opt(0x72, "F3"),
    opt(0x73, "F4"),
    opt(0x74, "F5"),
    opt(0x75, "F6"),
    opt(0x76, "F7"),
    opt(0x77, "F8"),
    opt(0x78, "F9"),
    opt(0x79, "F10"),
    opt(0x7A, "F11"),
    opt(0x7B, "F12"),
];

/// Full display name of `vk`, or `"UNKNOWN"`.
pub fn key_name(vk: u16) -> &'static str {
    KEY_OPTIONS
        .iter()
        .find(|o| o.vk == vk)
        .map(|o| o.name)
        .unwrap_or("UNKNOWN")
}

/// Short label drawn next to a row (at most three characters).
pub fn key_label(vk: u16) -> String {
    let fixed = match vk {
        VK_LEFT => Some("LFT"),
        VK_RIGHT => Some("RGT"),
        VK_UP => Some("UP"),
        VK_DOWN => Some("DWN"),
        VK_SPACE => Some("SPC"),
        VK_RETURN => Some("ENT"),
        VK_SHIFT => Some("SHF"),
        VK_CONTROL => Some("CTL"),
        _ => None,
    };
    match fixed {
        Some(label) => label.to_string(),
        None => key_name(vk).chars().take(3).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_lookup() {
        assert_eq!(key_name(VK_W), "W");
        assert_eq!(key_name(VK_SPACE), "SPACE");
        assert_eq!(key_name(0x7A), "F11");
        assert_eq!(key_name(0xFE), "UNKNOWN");
    }

    #[test]
    fn test_key_label_abbreviations() {
        assert_eq!(key_label(VK_LEFT), "LFT");
        assert_eq!(key_label(VK_CONTROL), "CTL");
        assert_eq!(key_label(VK_ESCAPE), "ESC");
        assert_eq!(key_label(VK_MENU), "ALT");
        assert_eq!(key_label(0x79), "F10");
        assert_eq!(key_label(VK_TAB), "TAB");
        assert_eq!(key_label(0xFE), "UNK");
    }

    #[test]
    fn test_every_option_code_is_unique() {
        for (i, a) in KEY_OPTIONS.iter().enumerate() {
            for b in &KEY_OPTIONS[i + 1..] {
                assert_ne!(a.vk, b.vk, "{} and {} share a VK code", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_letter_options_agree_with_vk_for_char() {
        for ch in 'A'..='Z' {
            let vk = windows_vk::vk_for_char(ch).unwrap();
            assert_eq!(key_name(vk), ch.to_string());
        }
    }
}
