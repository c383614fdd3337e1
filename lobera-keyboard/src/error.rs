//! Keyboard interface error types

use lobera_transport::TransportError;
use thiserror::Error;

/// Errors from keyboard operations
///
/// None of these are retried internally. A failure during a multi-request
/// write can leave the device holding a mix of old and new tables.
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A record was cut short while decoding
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Unrecognized opcode, entry type or enum value
    #[error("Unknown {what}: 0x{value:02X}")]
    UnknownOpcode { what: &'static str, value: u8 },

    /// Encode target cannot hold the encoded value
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Tables disagree with each other or with their headers
    #[error("Inconsistent device state: {0}")]
    InconsistentState(String),

    /// Invalid parameter value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
