//! Protocol constants for Lobera keyboard communication
//!
//! All configuration traffic is vendor control transfers on endpoint 0.
//! The request code selects the table, `index` selects profile and batch.

/// Vendor request codes
pub mod req {
    /// Finalize a configuration write (value 0, no payload).
    /// Same code as `SET_PROFILE`; the device tells them apart by `value`.
    pub const FINALIZE: u8 = 0x14;
    pub const GET_PROFILE: u8 = 0x15;
    pub const SET_PROFILE: u8 = 0x14;
    pub const GET_STATUS: u8 = 0x04;
    pub const SET_LIGHT_MODE: u8 = 0x31;
    pub const GET_COLORS: u8 = 0x33;
    pub const SET_COLORS: u8 = 0x32;
    pub const GET_THUMB_MACROS: u8 = 0x51;
    pub const SET_THUMB_MACROS: u8 = 0x50;
    pub const GET_THUMB_ENABLED: u8 = 0x53;
    pub const SET_THUMB_ENABLED: u8 = 0x52;
    pub const GET_KEY_OFFSETS: u8 = 0x11;
    pub const SET_KEY_OFFSETS: u8 = 0x10;
    pub const GET_KEY_DATA: u8 = 0x13;
    pub const SET_KEY_DATA: u8 = 0x12;
    pub const GET_KEY_REPEATS: u8 = 0x17;
    pub const SET_KEY_REPEATS: u8 = 0x16;

    /// Human-readable name of a read request
    pub fn read_name(code: u8) -> &'static str {
        match code {
            GET_PROFILE => "GET_PROFILE",
            GET_STATUS => "GET_STATUS",
            GET_COLORS => "GET_COLORS",
            GET_THUMB_MACROS => "GET_THUMB_MACROS",
            GET_THUMB_ENABLED => "GET_THUMB_ENABLED",
            GET_KEY_OFFSETS => "GET_KEY_OFFSETS",
            GET_KEY_DATA => "GET_KEY_DATA",
            GET_KEY_REPEATS => "GET_KEY_REPEATS",
            _ => "UNKNOWN",
        }
    }

    /// Human-readable name of a write request
    ///
    /// `0x14` is reported as `SET_PROFILE`; a finalize is the same request
    /// with value 0.
    pub fn write_name(code: u8) -> &'static str {
        match code {
            SET_PROFILE => "SET_PROFILE",
            SET_LIGHT_MODE => "SET_LIGHT_MODE",
            SET_COLORS => "SET_COLORS",
            SET_THUMB_MACROS => "SET_THUMB_MACROS",
            SET_THUMB_ENABLED => "SET_THUMB_ENABLED",
            SET_KEY_OFFSETS => "SET_KEY_OFFSETS",
            SET_KEY_DATA => "SET_KEY_DATA",
            SET_KEY_REPEATS => "SET_KEY_REPEATS",
            _ => "UNKNOWN",
        }
    }
}

/// USB control request types
pub mod request_type {
    /// Device-to-host, vendor, device recipient
    pub const VENDOR_IN: u8 = 0xC0;
    /// Host-to-device, vendor, device recipient
    pub const VENDOR_OUT: u8 = 0x40;
}

/// Fixed buffer sizes of the device
pub mod size {
    /// One transfer of the key payload blob
    pub const BATCH: usize = 4096;
    /// Key offset table
    pub const OFFSET_TABLE: usize = 575;
    /// Key repeat-mode table
    pub const REPEAT_TABLE: usize = 228;
    /// One thumb button's region inside the thumb macro block
    pub const THUMB_MACRO: usize = 1024;
    /// Whole thumb macro block (one batch)
    pub const THUMB_BLOCK: usize = BATCH;
    /// Status reply
    pub const STATUS: usize = 16;
    /// Colors block: 6 slots x RGB
    pub const COLORS: usize = 18;
}

/// Settle times the firmware needs after a request before it accepts the next.
///
/// Values are milliseconds. Commands that arrive earlier corrupt the
/// firmware's internal state.
pub mod pacing {
    pub const PROFILE_SWITCH_MS: u64 = 500;
    pub const LIGHT_MODE_MS: u64 = 500;
    pub const COLORS_MS: u64 = 500;
    pub const THUMB_MACROS_MS: u64 = 1500;
    pub const THUMB_ENABLED_MS: u64 = 500;
    pub const KEY_OFFSETS_MS: u64 = 500;
    pub const KEY_DATA_MS: u64 = 4000;
    pub const KEY_REPEATS_MS: u64 = 1000;
    /// Thumb block and thumb flags during a factory reset
    pub const RESET_THUMB_MS: u64 = 2000;
}

/// Timeout for a single control transfer (ms)
pub const TRANSFER_TIMEOUT_MS: u64 = 5000;

/// Number of on-device profiles (1-based)
pub const PROFILE_COUNT: u8 = 5;

/// Number of thumb buttons per profile (1-based)
pub const THUMB_COUNT: u8 = 3;

/// `index` for a batched table transfer: batch number in the high byte,
/// profile in the low byte.
pub fn batch_index(batch: u8, profile: u8) -> u16 {
    (u16::from(batch) << 8) | u16::from(profile)
}

/// `value` for a thumb-enabled write: enable flag in the high byte,
/// thumb number in the low byte.
pub fn thumb_enable_value(enabled: bool, thumb: u8) -> u16 {
    (u16::from(enabled) << 8) | u16::from(thumb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_index() {
        assert_eq!(batch_index(0, 1), 0x0001);
        assert_eq!(batch_index(2, 5), 0x0205);
    }

    #[test]
    fn test_thumb_enable_value() {
        assert_eq!(thumb_enable_value(true, 2), 0x0102);
        assert_eq!(thumb_enable_value(false, 3), 0x0003);
    }

    #[test]
    fn test_finalize_shares_profile_code() {
        assert_eq!(req::FINALIZE, req::SET_PROFILE);
        assert_eq!(req::write_name(req::FINALIZE), "SET_PROFILE");
    }
}
