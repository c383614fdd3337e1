//! Whole-profile key map assembly
//!
//! A profile's key configuration is spread over three device blobs:
//!
//! - the offset table, locating each key's payload ([`crate::offsets`])
//! - the repeat table, naming each key and its repeat mode ([`crate::repeats`])
//! - the key data blob, sent in 4096-byte batches
//!
//! Only the repeat table carries key codes. Offset entry *i* and repeat
//! entry *i* describe the same key, so both tables are always built from
//! one pass over the map and re-paired by position when read back. Do not
//! pair them by key code: the firmware does not.

use std::collections::BTreeMap;

use lobera_transport::protocol::size;
use tracing::{debug, warn};

use crate::error::KeyboardError;
use crate::key_setting::KeySetting;
use crate::offsets::{self, OffsetEntry, OffsetTableWriter};
use crate::repeats::{RepeatEntry, RepeatTableWriter};

/// Key code to setting, iterated in ascending key order
pub type KeysSettings = BTreeMap<u8, KeySetting>;

/// Keys a single profile can hold
pub const MAX_KEYS: usize = offsets::MAX_ENTRIES;

/// Number of 4096-byte batches needed for `payload_len` bytes (at least one)
pub fn batch_count(payload_len: usize) -> usize {
    payload_len.div_ceil(size::BATCH).max(1)
}

/// The three blobs making up one profile's key configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKeySettings {
    pub offset_table: Vec<u8>,
    pub repeat_table: Vec<u8>,
    /// Key payloads, zero-padded to a whole number of batches
    pub data: Vec<u8>,
}

impl EncodedKeySettings {
    pub fn batch_count(&self) -> usize {
        self.data.len() / size::BATCH
    }

    /// Payload batches in transfer order
    pub fn batches(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(size::BATCH)
    }
}

/// Encode a key map into offset table, repeat table and batched data
///
/// Key code 0 terminates the repeat table and cannot be stored.
pub fn encode_keys_settings(settings: &KeysSettings) -> Result<EncodedKeySettings, KeyboardError> {
    if settings.contains_key(&0) {
        return Err(KeyboardError::InvalidArgument(
            "key code 0x00 cannot be remapped".to_string(),
        ));
    }

    let kept = settings.len().min(MAX_KEYS);
    if kept < settings.len() {
        warn!(
            "Profile holds at most {} keys, dropping {}",
            MAX_KEYS,
            settings.len() - kept
        );
    }

    let payload: usize = settings
        .values()
        .take(kept)
        .map(KeySetting::required_size)
        .sum();
    let batches = batch_count(payload);
    debug!("Encoding {} keys, {} payload bytes in {} batches", kept, payload, batches);

    let mut data = vec![0u8; batches * size::BATCH];
    let mut offset_table = OffsetTableWriter::new();
    let mut repeat_table = RepeatTableWriter::new();

    for (&key, setting) in settings.iter().take(kept) {
        let start = offset_table.payload_size();
        if offset_table.push(setting)?.is_none() || !repeat_table.push(key, setting) {
            break;
        }
        setting.write_into(&mut data[start..])?;
    }

    Ok(EncodedKeySettings {
        offset_table: offset_table.finish()?,
        repeat_table: repeat_table.finish(),
        data,
    })
}

/// Rebuild a key map from decoded tables and the payload blob
///
/// Entries are paired by position. Tables of different length mean the
/// device state is inconsistent. If a key code appears twice, the first
/// pairing wins.
pub fn decode_keys_settings(
    offsets: &[OffsetEntry],
    repeats: &[RepeatEntry],
    blob: &[u8],
) -> Result<KeysSettings, KeyboardError> {
    if offsets.len() != repeats.len() {
        return Err(KeyboardError::InconsistentState(format!(
            "offset table has {} entries but repeat table has {}",
            offsets.len(),
            repeats.len()
        )));
    }

    let mut settings = KeysSettings::new();
    for (entry, repeat) in offsets.iter().zip(repeats) {
        let setting = KeySetting::decode(blob, entry, repeat.mode)?;
        if settings.contains_key(&repeat.key_code) {
            warn!(
                "Key 0x{:02X} listed twice in repeat table, keeping first entry",
                repeat.key_code
            );
            continue;
        }
        settings.insert(repeat.key_code, setting);
    }
    Ok(settings)
}
