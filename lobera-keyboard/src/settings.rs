//! Device status reply

use serde::{Deserialize, Serialize};

use crate::error::KeyboardError;
use crate::led::LightMode;

/// Byte positions in the status reply
pub mod field {
    pub const FULL_NKRO: usize = 0;
    pub const BRIGHTNESS: usize = 1;
    pub const LIGHT_MODE: usize = 4;
}

/// Parsed status reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Full N-key rollover enabled
    pub full_nkro: bool,
    /// Backlight brightness level
    pub brightness: u8,
    pub light_mode: LightMode,
}

impl DeviceStatus {
    /// Parse the 16-byte status reply
    ///
    /// Byte 0 is the NKRO flag, byte 1 brightness, byte 4 light mode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyboardError> {
        Ok(Self {
            full_nkro: status_byte(bytes, field::FULL_NKRO)? != 0,
            brightness: status_byte(bytes, field::BRIGHTNESS)?,
            light_mode: LightMode::try_from(status_byte(bytes, field::LIGHT_MODE)?)?,
        })
    }
}

/// One byte of the status reply, `MalformedData` if the reply is too short
pub fn status_byte(bytes: &[u8], pos: usize) -> Result<u8, KeyboardError> {
    bytes.get(pos).copied().ok_or_else(|| {
        KeyboardError::MalformedData(format!(
            "status reply of {} bytes has no byte {}",
            bytes.len(),
            pos
        ))
    })
}
