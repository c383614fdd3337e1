//! Transport layer for Lobera keyboard communication
//!
//! The keyboard is configured with vendor control transfers. This crate
//! provides the raw channel abstraction, the pacing layer the firmware
//! requires, and a libusb backend:
//!
//! ```text
//! [UsbChannel / test doubles]   ← implements ControlChannel (raw I/O)
//!            |
//!     [MonitorChannel]           ← optional traffic dump
//!            |
//!     [PacedTransport]           ← enforces firmware settle times
//!            |
//!   [KeyboardInterface / CLI]
//! ```

pub mod device_registry;
pub mod error;
pub mod monitor;
pub mod paced;
pub mod protocol;
pub mod types;

#[cfg(feature = "usb")]
mod usb;

pub use device_registry::{is_supported, PRODUCT_IDS, VENDOR_ID};
pub use error::TransportError;
pub use monitor::{MonitorChannel, MonitorConfig};
pub use paced::{Clock, ManualClock, PacedTransport, SystemClock};
pub use types::{Cooldown, DeviceInfo};

#[cfg(feature = "usb")]
pub use usb::{list_devices, UsbChannel};

/// The raw request/response primitive all backends implement
///
/// Implementations perform exactly one control transfer per call and
/// never retry. The channel is exclusively owned; callers that share it
/// across threads must serialize access themselves.
pub trait ControlChannel {
    /// Send a vendor OUT request
    ///
    /// # Arguments
    /// * `request` - Request code (e.g., `protocol::req::SET_KEY_DATA`)
    /// * `value` - wValue field
    /// * `index` - wIndex field (usually `(batch << 8) | profile`)
    /// * `payload` - Data stage, may be empty
    ///
    /// # Returns
    /// Number of bytes the device accepted
    fn send(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
    ) -> Result<usize, TransportError>;

    /// Send a vendor IN request and return the data stage
    ///
    /// The returned buffer may be shorter than `size`; callers that
    /// need an exact length check it themselves.
    fn receive(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
    ) -> Result<Vec<u8>, TransportError>;
}

impl<C: ControlChannel + ?Sized> ControlChannel for Box<C> {
    fn send(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        (**self).send(request, value, index, payload)
    }

    fn receive(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).receive(request, value, index, size)
    }
}

/// Type alias for a boxed channel
pub type BoxedChannel = Box<dyn ControlChannel + Send>;
