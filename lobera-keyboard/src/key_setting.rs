//! Per-key setting codec
//!
//! A key's payload lives in the shared key data blob at the place its
//! offset table entry points to. Disable and substitution take one byte,
//! a macro takes its instruction stream.

use serde::{Deserialize, Serialize};

use crate::error::KeyboardError;
use crate::macros::{self, Macro};
use crate::offsets::OffsetEntry;

/// Substitution codes at or above this value disable the key
pub const KEY_CODE_DISABLE: u8 = 0x8c;

/// How a key behaves while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RepeatMode {
    /// Fire once per press
    #[default]
    Single = 1,
    /// Repeat while held
    Press = 2,
    /// Each press advances to the next macro step
    Next = 3,
}

impl TryFrom<u8> for RepeatMode {
    type Error = KeyboardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Single),
            2 => Ok(Self::Press),
            3 => Ok(Self::Next),
            _ => Err(KeyboardError::UnknownOpcode {
                what: "repeat mode",
                value,
            }),
        }
    }
}

/// What a physical key does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Key sends nothing
    Disable,
    /// Key sends another HID usage code
    Substitute(u8),
    /// Key replays a script
    Macro(Macro),
}

/// A key's action together with its repeat behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySetting {
    pub action: KeyAction,
    #[serde(default)]
    pub repeat: RepeatMode,
}

impl KeySetting {
    pub fn new(action: KeyAction, repeat: RepeatMode) -> Self {
        Self { action, repeat }
    }

    pub fn disable(repeat: RepeatMode) -> Self {
        Self::new(KeyAction::Disable, repeat)
    }

    pub fn substitute(key: u8, repeat: RepeatMode) -> Self {
        Self::new(KeyAction::Substitute(key), repeat)
    }

    pub fn macro_script(entries: Macro, repeat: RepeatMode) -> Self {
        Self::new(KeyAction::Macro(entries), repeat)
    }

    /// Encoded payload size in the key data blob
    pub fn required_size(&self) -> usize {
        match &self.action {
            KeyAction::Disable | KeyAction::Substitute(_) => 1,
            KeyAction::Macro(entries) => macros::macro_size(entries),
        }
    }

    /// Encode the payload at the start of `buf`, returning bytes written
    ///
    /// Substitution codes are written verbatim; a code at or above
    /// [`KEY_CODE_DISABLE`] reads back as `Disable`.
    pub fn write_into(&self, buf: &mut [u8]) -> Result<usize, KeyboardError> {
        match &self.action {
            KeyAction::Disable => write_byte(buf, KEY_CODE_DISABLE),
            KeyAction::Substitute(key) => write_byte(buf, *key),
            KeyAction::Macro(entries) => macros::write_macro(entries, buf),
        }
    }

    /// Decode the payload `entry` points to inside `blob`
    ///
    /// The repeat mode comes from the repeat table entry at the same
    /// position as `entry`.
    pub fn decode(
        blob: &[u8],
        entry: &OffsetEntry,
        repeat: RepeatMode,
    ) -> Result<Self, KeyboardError> {
        match *entry {
            OffsetEntry::Substitute { offset, .. } => {
                let code = *blob.get(usize::from(offset)).ok_or_else(|| {
                    KeyboardError::MalformedData(format!(
                        "substitution at offset {offset} lies outside {}-byte key data",
                        blob.len()
                    ))
                })?;
                let action = if code >= KEY_CODE_DISABLE {
                    KeyAction::Disable
                } else {
                    KeyAction::Substitute(code)
                };
                Ok(Self::new(action, repeat))
            }
            OffsetEntry::Macro { offset, len } => {
                let start = usize::from(offset);
                let end = start + usize::from(len);
                let region = blob.get(start..end).ok_or_else(|| {
                    KeyboardError::MalformedData(format!(
                        "macro at {start}..{end} lies outside {}-byte key data",
                        blob.len()
                    ))
                })?;
                Ok(Self::new(KeyAction::Macro(macros::decode_macro(region)?), repeat))
            }
            OffsetEntry::None => Err(KeyboardError::UnknownOpcode {
                what: "key setting entry type",
                value: entry.type_byte(),
            }),
        }
    }
}

fn write_byte(buf: &mut [u8], value: u8) -> Result<usize, KeyboardError> {
    let slot = buf.first_mut().ok_or(KeyboardError::BufferTooSmall {
        needed: 1,
        available: 0,
    })?;
    *slot = value;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::MacroEntry::*;

    fn roundtrip(setting: &KeySetting) -> KeySetting {
        let mut blob = vec![0u8; 64];
        let len = setting.write_into(&mut blob[7..]).unwrap();
        assert_eq!(len, setting.required_size());
        let entry = match setting.action {
            KeyAction::Macro(_) => OffsetEntry::Macro {
                offset: 7,
                len: len as u16,
            },
            _ => OffsetEntry::Substitute {
                offset: 7,
                len: len as u16,
            },
        };
        KeySetting::decode(&blob, &entry, setting.repeat).unwrap()
    }

    #[test]
    fn test_roundtrip_each_variant() {
        let settings = [
            KeySetting::disable(RepeatMode::Single),
            KeySetting::substitute(0x16, RepeatMode::Press),
            KeySetting::macro_script(
                vec![KeyDown(0x04), Sleep(50), KeyUp(0x04), Sleep(50), Repeat(3)],
                RepeatMode::Next,
            ),
            KeySetting::macro_script(Vec::new(), RepeatMode::Single),
        ];
        for setting in &settings {
            assert_eq!(&roundtrip(setting), setting);
        }
    }

    #[test]
    fn test_disable_sentinel() {
        let entry = OffsetEntry::Substitute { offset: 0, len: 1 };
        for code in [0x8c, 0x8d, 0xff] {
            let s = KeySetting::decode(&[code], &entry, RepeatMode::Single).unwrap();
            assert_eq!(s.action, KeyAction::Disable);
        }
        let s = KeySetting::decode(&[0x8b], &entry, RepeatMode::Single).unwrap();
        assert_eq!(s.action, KeyAction::Substitute(0x8b));
    }

    #[test]
    fn test_disable_encodes_sentinel() {
        let mut buf = [0u8; 1];
        KeySetting::disable(RepeatMode::Single)
            .write_into(&mut buf)
            .unwrap();
        assert_eq!(buf, [KEY_CODE_DISABLE]);
    }

    #[test]
    fn test_none_entry_is_unknown() {
        let err = KeySetting::decode(&[0; 4], &OffsetEntry::None, RepeatMode::Single).unwrap_err();
        assert!(matches!(err, KeyboardError::UnknownOpcode { value: 0, .. }));
    }

    #[test]
    fn test_region_outside_blob() {
        let entry = OffsetEntry::Macro { offset: 2, len: 6 };
        let err = KeySetting::decode(&[0; 4], &entry, RepeatMode::Single).unwrap_err();
        assert!(matches!(err, KeyboardError::MalformedData(_)));

        let entry = OffsetEntry::Substitute { offset: 4, len: 1 };
        let err = KeySetting::decode(&[0; 4], &entry, RepeatMode::Single).unwrap_err();
        assert!(matches!(err, KeyboardError::MalformedData(_)));
    }

    #[test]
    fn test_write_into_empty_buffer() {
        let err = KeySetting::substitute(4, RepeatMode::Single)
            .write_into(&mut [])
            .unwrap_err();
        assert!(matches!(err, KeyboardError::BufferTooSmall { needed: 1, .. }));
    }

    #[test]
    fn test_repeat_mode_from_byte() {
        assert_eq!(RepeatMode::try_from(2).unwrap(), RepeatMode::Press);
        assert!(matches!(
            RepeatMode::try_from(0).unwrap_err(),
            KeyboardError::UnknownOpcode { value: 0, .. }
        ));
        assert!(RepeatMode::try_from(4).is_err());
    }
}
