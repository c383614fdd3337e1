//! HID keyboard usage names
//!
//! Names avoid `,`, `:` and `+` so they can appear inside macro sequences.

/// Get the name of a HID keyboard usage code
#[rustfmt::skip]
pub fn key_name(code: u8) -> &'static str {
    match code {
        0x00 => "None",
        0x04 => "A", 0x05 => "B", 0x06 => "C", 0x07 => "D",
        0x08 => "E", 0x09 => "F", 0x0A => "G", 0x0B => "H",
        0x0C => "I", 0x0D => "J", 0x0E => "K", 0x0F => "L",
        0x10 => "M", 0x11 => "N", 0x12 => "O", 0x13 => "P",
        0x14 => "Q", 0x15 => "R", 0x16 => "S", 0x17 => "T",
        0x18 => "U", 0x19 => "V", 0x1A => "W", 0x1B => "X",
        0x1C => "Y", 0x1D => "Z",
        0x1E => "1", 0x1F => "2", 0x20 => "3", 0x21 => "4",
        0x22 => "5", 0x23 => "6", 0x24 => "7", 0x25 => "8",
        0x26 => "9", 0x27 => "0",
        0x28 => "Enter", 0x29 => "Escape", 0x2A => "Backspace",
        0x2B => "Tab", 0x2C => "Space", 0x2D => "Minus", 0x2E => "Equal",
        0x2F => "LBracket", 0x30 => "RBracket", 0x31 => "Backslash", 0x32 => "NonUSHash",
        0x33 => "Semicolon", 0x34 => "Quote", 0x35 => "Grave", 0x36 => "Comma",
        0x37 => "Period", 0x38 => "Slash", 0x39 => "CapsLock",
        0x3A => "F1", 0x3B => "F2", 0x3C => "F3", 0x3D => "F4",
        0x3E => "F5", 0x3F => "F6", 0x40 => "F7", 0x41 => "F8",
        0x42 => "F9", 0x43 => "F10", 0x44 => "F11", 0x45 => "F12",
        0x46 => "PrintScr", 0x47 => "ScrollLock", 0x48 => "Pause",
        0x49 => "Insert", 0x4A => "Home", 0x4B => "PageUp",
        0x4C => "Delete", 0x4D => "End", 0x4E => "PageDown",
        0x4F => "Right", 0x50 => "Left", 0x51 => "Down", 0x52 => "Up",
        0x53 => "NumLock", 0x54 => "KPSlash", 0x55 => "KPAsterisk", 0x56 => "KPMinus",
        0x57 => "KPPlus", 0x58 => "KPEnter",
        0x59 => "KP1", 0x5A => "KP2", 0x5B => "KP3", 0x5C => "KP4",
        0x5D => "KP5", 0x5E => "KP6", 0x5F => "KP7", 0x60 => "KP8",
        0x61 => "KP9", 0x62 => "KP0", 0x63 => "KPDot",
        0x64 => "NonUSBackslash", 0x65 => "App", 0x66 => "Power",
        0x67 => "KPEqual",
        0x68 => "F13", 0x69 => "F14", 0x6A => "F15", 0x6B => "F16",
        0x6C => "F17", 0x6D => "F18", 0x6E => "F19", 0x6F => "F20",
        0x70 => "F21", 0x71 => "F22", 0x72 => "F23", 0x73 => "F24",
        0x7F => "Mute", 0x80 => "VolumeUp", 0x81 => "VolumeDown",
        0xE0 => "LCtrl", 0xE1 => "LShift", 0xE2 => "LAlt", 0xE3 => "LGUI",
        0xE4 => "RCtrl", 0xE5 => "RShift", 0xE6 => "RAlt", 0xE7 => "RGUI",
        _ => "?",
    }
}

/// Name of `code`, or `0xNN` when it has none
pub fn key_label(code: u8) -> String {
    match key_name(code) {
        "?" => format!("0x{code:02X}"),
        name => name.to_string(),
    }
}

/// Look up a key by name (case-insensitive) or `0xNN` hex code
pub fn key_code_from_name(name: &str) -> Option<u8> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).ok();
    }

    let lower = name.to_ascii_lowercase();
    let alias = match lower.as_str() {
        "esc" => Some(0x29),
        "return" => Some(0x28),
        "bksp" => Some(0x2A),
        "del" => Some(0x4C),
        "ins" => Some(0x49),
        "pgup" => Some(0x4B),
        "pgdn" => Some(0x4E),
        "caps" => Some(0x39),
        "menu" => Some(0x65),
        "ctrl" | "control" => Some(0xE0),
        "shift" => Some(0xE1),
        "alt" | "option" => Some(0xE2),
        "gui" | "win" | "super" | "cmd" | "lwin" => Some(0xE3),
        "altgr" => Some(0xE6),
        "rwin" => Some(0xE7),
        _ => None,
    };
    if alias.is_some() {
        return alias;
    }

    (0x01..=0xE7u8)
        .chain(std::iter::once(0x00))
        .find(|&code| {
            let known = key_name(code);
            known != "?" && known.eq_ignore_ascii_case(name)
        })
}

/// Whether `code` is a modifier key (0xE0-0xE7)
pub fn is_modifier(code: u8) -> bool {
    (0xE0..=0xE7).contains(&code)
}
