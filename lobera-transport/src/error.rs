//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    /// The device accepted fewer bytes than were offered
    #[error("Short transfer for request 0x{request:02X}: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        request: u8,
        expected: usize,
        actual: usize,
    },

    // USB-specific errors
    #[error("USB error: {0}")]
    Usb(String),

    #[error("USB permission denied: {0}")]
    UsbPermissionDenied(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "usb")]
impl From<rusb::Error> for TransportError {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Timeout => TransportError::Timeout,
            rusb::Error::NoDevice => TransportError::Disconnected,
            rusb::Error::NotFound => TransportError::DeviceNotFound(e.to_string()),
            rusb::Error::Access => TransportError::UsbPermissionDenied(e.to_string()),
            _ => TransportError::Usb(e.to_string()),
        }
    }
}
