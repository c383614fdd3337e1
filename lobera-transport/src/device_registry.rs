//! Device registry - USB identifiers of supported keyboards

/// Lobera vendor ID
pub const VENDOR_ID: u16 = 0x195d;

/// Known product IDs
///
/// Both variants speak the same control-transfer protocol.
pub const PRODUCT_IDS: &[u16] = &[
    0x2033, // Lobera
    0x2034, // Lobera (revision B)
];

/// Check if a VID/PID pair is a supported keyboard
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && PRODUCT_IDS.contains(&pid)
}
