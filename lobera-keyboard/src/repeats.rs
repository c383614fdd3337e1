//! Key repeat table codec
//!
//! Fixed 228-byte table of `(key code, repeat mode)` pairs in key order.
//! A zero key code ends the table; unused space is filled with
//! `00 01` pairs while at least two bytes remain.

use lobera_transport::protocol::size;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::KeyboardError;
use crate::key_setting::{KeySetting, RepeatMode};
use crate::key_settings::KeysSettings;

/// Record size in bytes
pub const RECORD_SIZE: usize = 2;
/// Records that fit in the table
pub const MAX_ENTRIES: usize = size::REPEAT_TABLE / RECORD_SIZE;

const FILLER: [u8; RECORD_SIZE] = [0x00, 0x01];

/// One row of the repeat table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatEntry {
    pub key_code: u8,
    pub mode: RepeatMode,
}

/// Decode a repeat table, stopping at the first zero key code
pub fn decode_repeat_table(data: &[u8]) -> Result<Vec<RepeatEntry>, KeyboardError> {
    let mut entries = Vec::new();
    let mut p = 0;
    while p < data.len() {
        let key_code = data[p];
        if key_code == 0 {
            break;
        }
        let Some(&mode) = data.get(p + 1) else {
            return Err(KeyboardError::MalformedData(format!(
                "repeat entry for key 0x{key_code:02X} at byte {p} truncated"
            )));
        };
        entries.push(RepeatEntry {
            key_code,
            mode: RepeatMode::try_from(mode)?,
        });
        p += RECORD_SIZE;
    }
    Ok(entries)
}

/// Incremental repeat table encoder
#[derive(Debug)]
pub struct RepeatTableWriter {
    table: Vec<u8>,
    pos: usize,
}

impl Default for RepeatTableWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RepeatTableWriter {
    pub fn new() -> Self {
        Self {
            table: vec![0u8; size::REPEAT_TABLE],
            pos: 0,
        }
    }

    /// Whether another record fits
    pub fn has_room(&self) -> bool {
        self.table.len() - self.pos >= RECORD_SIZE
    }

    /// Append a record; returns `false` if the table is full
    pub fn push(&mut self, key_code: u8, setting: &KeySetting) -> bool {
        if !self.has_room() {
            return false;
        }
        self.table[self.pos] = key_code;
        self.table[self.pos + 1] = setting.repeat as u8;
        self.pos += RECORD_SIZE;
        true
    }

    /// Pad the remaining space and return the table
    pub fn finish(mut self) -> Vec<u8> {
        while self.pos + 1 < self.table.len() {
            self.table[self.pos..self.pos + RECORD_SIZE].copy_from_slice(&FILLER);
            self.pos += RECORD_SIZE;
        }
        self.table
    }
}

/// Encode the repeat table for a whole key map
pub fn encode_repeat_table(settings: &KeysSettings) -> Vec<u8> {
    let mut writer = RepeatTableWriter::new();
    for (&key, setting) in settings {
        if !writer.push(key, setting) {
            warn!("Repeat table full, dropping key 0x{:02X} and later keys", key);
            break;
        }
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stops_at_zero_key() {
        let data = [0x1e, 0x01, 0x1f, 0x03, 0x00, 0x01, 0x00, 0x01];
        let entries = decode_repeat_table(&data).unwrap();
        assert_eq!(
            entries,
            vec![
                RepeatEntry { key_code: 0x1e, mode: RepeatMode::Single },
                RepeatEntry { key_code: 0x1f, mode: RepeatMode::Next },
            ]
        );
    }

    #[test]
    fn test_decode_unknown_mode() {
        assert!(matches!(
            decode_repeat_table(&[0x1e, 0x04]).unwrap_err(),
            KeyboardError::UnknownOpcode { value: 0x04, .. }
        ));
        assert!(matches!(
            decode_repeat_table(&[0x1e, 0x00]).unwrap_err(),
            KeyboardError::UnknownOpcode { value: 0x00, .. }
        ));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(
            decode_repeat_table(&[0x1e, 0x01, 0x20]).unwrap_err(),
            KeyboardError::MalformedData(_)
        ));
    }

    #[test]
    fn test_encode_layout() {
        let mut settings = KeysSettings::new();
        settings.insert(0x20, KeySetting::substitute(0x05, RepeatMode::Press));
        settings.insert(0x1e, KeySetting::disable(RepeatMode::Next));

        let t = encode_repeat_table(&settings);
        assert_eq!(t.len(), 228);
        assert_eq!(&t[..4], &[0x1e, 0x03, 0x20, 0x02]);
        for pair in t[4..].chunks(2) {
            assert_eq!(pair, &[0x00, 0x01]);
        }
    }

    #[test]
    fn test_encode_empty_decodes_empty() {
        let t = encode_repeat_table(&KeysSettings::new());
        assert!(decode_repeat_table(&t).unwrap().is_empty());
    }

    #[test]
    fn test_encode_full_table_has_no_filler() {
        let settings: KeysSettings = (1..=120u8)
            .map(|k| (k, KeySetting::substitute(4, RepeatMode::Single)))
            .collect();
        let t = encode_repeat_table(&settings);
        let entries = decode_repeat_table(&t).unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries.last().unwrap().key_code, MAX_ENTRIES as u8);
    }
}
