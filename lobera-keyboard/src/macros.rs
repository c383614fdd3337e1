//! Macro instruction stream codec
//!
//! A macro is stored as a run of 3-byte records. Decoding stops at the
//! first `0x00` opcode; anything after it is padding.
//!
//! ```text
//! 84 kk ff   key kk down (ff != 0) or up (ff == 0)
//! 86 hh ll   repeat the macro hhll times
//! 87 hh ll   sleep hhll milliseconds
//! ```

use serde::{Deserialize, Serialize};

use crate::error::KeyboardError;

/// Macro opcodes
pub mod op {
    pub const END: u8 = 0x00;
    pub const KEY: u8 = 0x84;
    pub const REPEAT: u8 = 0x86;
    pub const SLEEP: u8 = 0x87;
}

/// Encoded size of every macro record
pub const RECORD_SIZE: usize = 3;

/// One instruction of a macro script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroEntry {
    /// Press a key (HID usage code)
    KeyDown(u8),
    /// Release a key (HID usage code)
    KeyUp(u8),
    /// Repeat the script this many times
    Repeat(u16),
    /// Wait this many milliseconds
    Sleep(u16),
}

impl MacroEntry {
    /// Wire record for this entry
    pub fn to_record(self) -> [u8; RECORD_SIZE] {
        match self {
            Self::KeyDown(key) => [op::KEY, key, 1],
            Self::KeyUp(key) => [op::KEY, key, 0],
            Self::Repeat(count) => {
                let [hi, lo] = count.to_be_bytes();
                [op::REPEAT, hi, lo]
            }
            Self::Sleep(ms) => {
                let [hi, lo] = ms.to_be_bytes();
                [op::SLEEP, hi, lo]
            }
        }
    }
}

/// An ordered macro script; empty means "no macro"
pub type Macro = Vec<MacroEntry>;

/// Decode a macro instruction stream
///
/// Fails with `UnknownOpcode` on an unrecognized leading byte and with
/// `MalformedData` when a record is cut off by the end of `data`.
pub fn decode_macro(data: &[u8]) -> Result<Macro, KeyboardError> {
    let mut entries = Vec::new();
    let mut p = 0;

    while p < data.len() {
        let record = || {
            data.get(p..p + RECORD_SIZE).ok_or_else(|| {
                KeyboardError::MalformedData(format!(
                    "macro record at offset {p} truncated ({} of {RECORD_SIZE} bytes)",
                    data.len() - p
                ))
            })
        };

        let entry = match data[p] {
            op::END => break,
            op::KEY => {
                let r = record()?;
                if r[2] != 0 {
                    MacroEntry::KeyDown(r[1])
                } else {
                    MacroEntry::KeyUp(r[1])
                }
            }
            op::REPEAT => {
                let r = record()?;
                MacroEntry::Repeat(u16::from_be_bytes([r[1], r[2]]))
            }
            op::SLEEP => {
                let r = record()?;
                MacroEntry::Sleep(u16::from_be_bytes([r[1], r[2]]))
            }
            other => {
                return Err(KeyboardError::UnknownOpcode {
                    what: "macro opcode",
                    value: other,
                })
            }
        };
        entries.push(entry);
        p += RECORD_SIZE;
    }

    Ok(entries)
}

/// Number of bytes `entries` occupies on the wire
pub fn macro_size(entries: &[MacroEntry]) -> usize {
    entries.len() * RECORD_SIZE
}

/// Encode `entries` at the start of `buf`
///
/// Returns the number of bytes written. Nothing is written if `buf`
/// cannot hold the whole macro.
pub fn write_macro(entries: &[MacroEntry], buf: &mut [u8]) -> Result<usize, KeyboardError> {
    let needed = macro_size(entries);
    if buf.len() < needed {
        return Err(KeyboardError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }

    for (entry, slot) in entries.iter().zip(buf.chunks_exact_mut(RECORD_SIZE)) {
        slot.copy_from_slice(&entry.to_record());
    }
    Ok(needed)
}

/// Encode `entries` into a new buffer
pub fn encode_macro(entries: &[MacroEntry]) -> Vec<u8> {
    entries.iter().flat_map(|e| e.to_record()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use MacroEntry::*;

    fn sample() -> Macro {
        vec![KeyDown(0x1e), Sleep(50), KeyUp(0x1e), Repeat(3)]
    }

    #[test]
    fn test_encode_known_bytes() {
        assert_eq!(
            encode_macro(&sample()),
            [0x84, 0x1e, 0x01, 0x87, 0x00, 0x32, 0x84, 0x1e, 0x00, 0x86, 0x00, 0x03]
        );
    }

    #[test]
    fn test_decode_known_bytes() {
        let data = [
            0x84, 0x1e, 0x01, 0x87, 0x00, 0x32, 0x84, 0x1e, 0x00, 0x86, 0x00, 0x03,
        ];
        assert_eq!(decode_macro(&data).unwrap(), sample());
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        let mut data = encode_macro(&[KeyDown(4), KeyUp(4)]);
        data.extend_from_slice(&[0x00, 0x99, 0x99, 0x99]);
        assert_eq!(decode_macro(&data).unwrap(), vec![KeyDown(4), KeyUp(4)]);
    }

    #[test]
    fn test_decode_empty_and_zeroed() {
        assert!(decode_macro(&[]).unwrap().is_empty());
        assert!(decode_macro(&[0; 1024]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_big_endian_values() {
        let entries = decode_macro(&[0x86, 0x01, 0x02, 0x87, 0xff, 0xfe]).unwrap();
        assert_eq!(entries, vec![Repeat(0x0102), Sleep(0xfffe)]);
    }

    #[test]
    fn test_any_nonzero_flag_is_key_down() {
        assert_eq!(decode_macro(&[0x84, 0x04, 0x7f]).unwrap(), vec![KeyDown(4)]);
    }

    #[test]
    fn test_truncated_record() {
        let err = decode_macro(&[0x84, 0x1e]).unwrap_err();
        assert!(matches!(err, KeyboardError::MalformedData(_)));

        let err = decode_macro(&[0x87, 0x00, 0x32, 0x86]).unwrap_err();
        assert!(matches!(err, KeyboardError::MalformedData(_)));
    }

    #[test]
    fn test_unknown_opcode() {
        let err = decode_macro(&[0x99, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            KeyboardError::UnknownOpcode { value: 0x99, .. }
        ));
    }

    #[test]
    fn test_write_into_buffer() {
        let mut buf = [0xaa; 16];
        let n = write_macro(&sample(), &mut buf).unwrap();
        assert_eq!(n, 12);
        assert_eq!(&buf[..12], encode_macro(&sample()).as_slice());
        assert_eq!(&buf[12..], &[0xaa; 4]);
    }

    #[test]
    fn test_write_buffer_too_small() {
        let mut buf = [0u8; 11];
        let err = write_macro(&sample(), &mut buf).unwrap_err();
        assert!(matches!(
            err,
            KeyboardError::BufferTooSmall {
                needed: 12,
                available: 11
            }
        ));
        assert_eq!(buf, [0u8; 11]);
    }

    #[test]
    fn test_size_matches_written() {
        assert_eq!(macro_size(&sample()), 12);
        assert_eq!(macro_size(&[]), 0);
    }

    #[test]
    fn test_roundtrip_extremes() {
        let m = vec![KeyDown(0xff), KeyUp(0x01), Repeat(u16::MAX), Sleep(0), Repeat(0)];
        assert_eq!(decode_macro(&encode_macro(&m)).unwrap(), m);
    }
}
