//! Key offset table codec
//!
//! Fixed 575-byte table locating every configured key's payload inside
//! the key data blob.
//!
//! ```text
//! [0]      magic 0x72 (0x00 on a never-written profile)
//! [1..3]   table size, big-endian (575, or 0 for "no data")
//! [3..5]   total payload size, big-endian
//! [5..]    5-byte entries: type, offset (BE u16), length (BE u16)
//!          type 0x10 = one-byte substitution/disable, 0x20 = macro,
//!          0x00 ends the table
//! ```
//!
//! Entries carry no key code. Entry *i* belongs to the key named by
//! entry *i* of the repeat table; see [`crate::key_settings`].

use lobera_transport::protocol::size;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zerocopy::byteorder::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::KeyboardError;
use crate::key_setting::{KeyAction, KeySetting};
use crate::key_settings::KeysSettings;

/// Header magic of a written table
pub const MAGIC: u8 = 0x72;
/// Header size in bytes
pub const HEADER_SIZE: usize = 5;
/// Entry size in bytes
pub const ENTRY_SIZE: usize = 5;
/// Entries that fit in the table
pub const MAX_ENTRIES: usize = (size::OFFSET_TABLE - HEADER_SIZE) / ENTRY_SIZE;

/// Entry type bytes
pub mod kind {
    pub const NONE: u8 = 0x00;
    pub const SUBSTITUTE: u8 = 0x10;
    pub const MACRO: u8 = 0x20;
}

/// Where one key's payload lives in the key data blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetEntry {
    /// Table terminator
    None,
    /// One byte: substitution code or disable sentinel
    Substitute { offset: u16, len: u16 },
    /// Macro instruction stream
    Macro { offset: u16, len: u16 },
}

impl OffsetEntry {
    /// Wire type byte
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::None => kind::NONE,
            Self::Substitute { .. } => kind::SUBSTITUTE,
            Self::Macro { .. } => kind::MACRO,
        }
    }

    /// Entry describing `setting`'s payload at `offset`
    pub fn for_setting(setting: &KeySetting, offset: u16, len: u16) -> Self {
        match setting.action {
            KeyAction::Disable | KeyAction::Substitute(_) => Self::Substitute { offset, len },
            KeyAction::Macro(_) => Self::Macro { offset, len },
        }
    }

    fn to_record(self) -> OffsetRecord {
        let (offset, len) = match self {
            Self::None => (0, 0),
            Self::Substitute { offset, len } | Self::Macro { offset, len } => (offset, len),
        };
        OffsetRecord {
            kind: self.type_byte(),
            offset: U16::new(offset),
            len: U16::new(len),
        }
    }
}

#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct TableHeader {
    magic: u8,
    table_size: U16,
    payload_size: U16,
}

#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct OffsetRecord {
    kind: u8,
    offset: U16,
    len: U16,
}

/// A decoded offset table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffsetTable {
    /// Entries in table order, terminator excluded
    pub entries: Vec<OffsetEntry>,
    /// Declared total payload size
    pub payload_size: u16,
}

/// Decode an offset table
///
/// The header is validated first: magic must be `0x72` (or `0x00` for a
/// blank table) and the declared size 575 (or 0). Any mismatch is
/// `InconsistentState`.
pub fn decode_offset_table(data: &[u8]) -> Result<OffsetTable, KeyboardError> {
    let (header, _) = TableHeader::read_from_prefix(data).map_err(|_| {
        KeyboardError::MalformedData(format!("offset table header needs {HEADER_SIZE} bytes"))
    })?;

    if header.magic != MAGIC && header.magic != 0 {
        return Err(KeyboardError::InconsistentState(format!(
            "offset table magic 0x{:02X}, expected 0x{MAGIC:02X}",
            header.magic
        )));
    }
    let declared = usize::from(header.table_size.get());
    if declared != size::OFFSET_TABLE && declared != 0 {
        return Err(KeyboardError::InconsistentState(format!(
            "offset table declares {declared} bytes, expected {}",
            size::OFFSET_TABLE
        )));
    }

    let mut entries = Vec::new();
    let mut p = HEADER_SIZE;
    while p < data.len() {
        let entry = match data[p] {
            kind::NONE => break,
            k @ (kind::SUBSTITUTE | kind::MACRO) => {
                let (record, _) = OffsetRecord::read_from_prefix(&data[p..]).map_err(|_| {
                    KeyboardError::MalformedData(format!(
                        "offset entry at byte {p} truncated ({} of {ENTRY_SIZE} bytes)",
                        data.len() - p
                    ))
                })?;
                let (offset, len) = (record.offset.get(), record.len.get());
                if k == kind::SUBSTITUTE {
                    OffsetEntry::Substitute { offset, len }
                } else {
                    OffsetEntry::Macro { offset, len }
                }
            }
            other => {
                return Err(KeyboardError::UnknownOpcode {
                    what: "offset entry type",
                    value: other,
                })
            }
        };
        entries.push(entry);
        p += ENTRY_SIZE;
    }

    Ok(OffsetTable {
        entries,
        payload_size: header.payload_size.get(),
    })
}

/// Incremental offset table encoder
///
/// Settings are pushed in key order; each push assigns the next payload
/// region. Once the table is full further pushes are ignored.
#[derive(Debug)]
pub struct OffsetTableWriter {
    table: Vec<u8>,
    pos: usize,
    payload_size: usize,
}

impl Default for OffsetTableWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetTableWriter {
    pub fn new() -> Self {
        Self {
            table: vec![0u8; size::OFFSET_TABLE],
            pos: HEADER_SIZE,
            payload_size: 0,
        }
    }

    /// Whether another entry fits
    pub fn has_room(&self) -> bool {
        self.table.len() - self.pos >= ENTRY_SIZE
    }

    /// Append an entry for `setting`
    ///
    /// Returns the entry written, or `None` if the table is already full.
    pub fn push(&mut self, setting: &KeySetting) -> Result<Option<OffsetEntry>, KeyboardError> {
        if !self.has_room() {
            return Ok(None);
        }

        let len = setting.required_size();
        let offset = u16::try_from(self.payload_size).map_err(|_| {
            KeyboardError::InvalidArgument(format!(
                "key payload offset {} exceeds 16 bits",
                self.payload_size
            ))
        })?;
        let len16 = u16::try_from(len).map_err(|_| {
            KeyboardError::InvalidArgument(format!("key payload of {len} bytes exceeds 16 bits"))
        })?;

        let entry = OffsetEntry::for_setting(setting, offset, len16);
        self.table[self.pos..self.pos + ENTRY_SIZE].copy_from_slice(entry.to_record().as_bytes());
        self.pos += ENTRY_SIZE;
        self.payload_size += len;
        Ok(Some(entry))
    }

    /// Total payload bytes assigned so far
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Write the header and return the finished table
    pub fn finish(mut self) -> Result<Vec<u8>, KeyboardError> {
        let payload_size = u16::try_from(self.payload_size).map_err(|_| {
            KeyboardError::InvalidArgument(format!(
                "total key payload of {} bytes exceeds 16 bits",
                self.payload_size
            ))
        })?;
        let header = TableHeader {
            magic: MAGIC,
            table_size: U16::new(size::OFFSET_TABLE as u16),
            payload_size: U16::new(payload_size),
        };
        self.table[..HEADER_SIZE].copy_from_slice(header.as_bytes());
        Ok(self.table)
    }
}

/// Encode the offset table for a whole key map
///
/// Keys beyond [`MAX_ENTRIES`] are dropped.
pub fn encode_offset_table(settings: &KeysSettings) -> Result<Vec<u8>, KeyboardError> {
    let mut writer = OffsetTableWriter::new();
    for (key, setting) in settings {
        if writer.push(setting)?.is_none() {
            warn!("Offset table full, dropping key 0x{:02X} and later keys", key);
            break;
        }
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_setting::RepeatMode;
    use crate::macros::MacroEntry::*;

    fn table_with(entries: &[[u8; 5]]) -> Vec<u8> {
        let mut t = vec![0u8; size::OFFSET_TABLE];
        t[..5].copy_from_slice(&[0x72, 0x02, 0x3f, 0x00, 0x00]);
        for (i, e) in entries.iter().enumerate() {
            t[5 + i * 5..10 + i * 5].copy_from_slice(e);
        }
        t
    }

    #[test]
    fn test_decode_entries() {
        let t = table_with(&[[0x10, 0x00, 0x00, 0x00, 0x01], [0x20, 0x00, 0x01, 0x00, 0x0f]]);
        let table = decode_offset_table(&t).unwrap();
        assert_eq!(
            table.entries,
            vec![
                OffsetEntry::Substitute { offset: 0, len: 1 },
                OffsetEntry::Macro { offset: 1, len: 15 },
            ]
        );
    }

    #[test]
    fn test_decode_blank_table() {
        let table = decode_offset_table(&[0u8; size::OFFSET_TABLE]).unwrap();
        assert!(table.entries.is_empty());
        assert_eq!(table.payload_size, 0);
    }

    #[test]
    fn test_decode_rejects_bad_header() {
        let mut t = table_with(&[]);
        t[0] = 0x71;
        assert!(matches!(
            decode_offset_table(&t).unwrap_err(),
            KeyboardError::InconsistentState(_)
        ));

        let mut t = table_with(&[]);
        t[2] = 0x40;
        assert!(matches!(
            decode_offset_table(&t).unwrap_err(),
            KeyboardError::InconsistentState(_)
        ));
    }

    #[test]
    fn test_decode_unknown_entry_type() {
        let t = table_with(&[[0x30, 0, 0, 0, 1]]);
        assert!(matches!(
            decode_offset_table(&t).unwrap_err(),
            KeyboardError::UnknownOpcode { value: 0x30, .. }
        ));
    }

    #[test]
    fn test_decode_truncated_entry() {
        let mut t = table_with(&[]);
        t.truncate(8);
        t[5] = 0x10;
        assert!(matches!(
            decode_offset_table(&t).unwrap_err(),
            KeyboardError::MalformedData(_)
        ));
    }

    #[test]
    fn test_encode_layout() {
        let mut settings = KeysSettings::new();
        settings.insert(
            0x1e,
            KeySetting::macro_script(
                vec![KeyDown(0x04), Sleep(50), KeyUp(0x04), Sleep(50), Repeat(3)],
                RepeatMode::Single,
            ),
        );
        settings.insert(0x1f, KeySetting::substitute(0x16, RepeatMode::Press));
        settings.insert(0x20, KeySetting::disable(RepeatMode::Single));

        let t = encode_offset_table(&settings).unwrap();
        assert_eq!(t.len(), 575);
        assert_eq!(&t[..5], &[0x72, 0x02, 0x3f, 0x00, 0x11]);
        assert_eq!(&t[5..10], &[0x20, 0x00, 0x00, 0x00, 0x0f]);
        assert_eq!(&t[10..15], &[0x10, 0x00, 0x0f, 0x00, 0x01]);
        assert_eq!(&t[15..20], &[0x10, 0x00, 0x10, 0x00, 0x01]);
        assert!(t[20..].iter().all(|&b| b == 0));

        let table = decode_offset_table(&t).unwrap();
        assert_eq!(table.entries.len(), 3);
        assert_eq!(table.payload_size, 17);
    }

    #[test]
    fn test_encode_empty() {
        let t = encode_offset_table(&KeysSettings::new()).unwrap();
        assert_eq!(&t[..5], &[0x72, 0x02, 0x3f, 0x00, 0x00]);
        assert!(decode_offset_table(&t).unwrap().entries.is_empty());
    }

    #[test]
    fn test_encode_stops_when_full() {
        let settings: KeysSettings = (1..=120u8)
            .map(|k| (k, KeySetting::substitute(4, RepeatMode::Single)))
            .collect();
        let t = encode_offset_table(&settings).unwrap();
        let table = decode_offset_table(&t).unwrap();
        assert_eq!(table.entries.len(), MAX_ENTRIES);
        assert_eq!(usize::from(table.payload_size), MAX_ENTRIES);
    }

    #[test]
    fn test_offset_overflow() {
        let big = vec![Sleep(1); 20_000];
        let mut settings = KeysSettings::new();
        settings.insert(1, KeySetting::macro_script(big.clone(), RepeatMode::Single));
        settings.insert(2, KeySetting::macro_script(big, RepeatMode::Single));
        assert!(matches!(
            encode_offset_table(&settings).unwrap_err(),
            KeyboardError::InvalidArgument(_)
        ));
    }
}
