//! Monitor middleware for tracing control transfers
//!
//! Wraps any `ControlChannel` and prints every request and reply passing
//! through it to stderr.
//!
//! # Example
//!
//! ```ignore
//! use lobera_transport::{MonitorChannel, MonitorConfig, PacedTransport, UsbChannel};
//!
//! let usb = UsbChannel::open_any()?;
//! let monitored = MonitorChannel::wrap(usb, MonitorConfig::default().with_hex(true));
//! let transport = PacedTransport::new(monitored);
//! ```

use crossterm::style::Stylize;

use crate::error::TransportError;
use crate::protocol::req;
use crate::ControlChannel;

/// Bytes shown per hex dump line
const HEX_LINE: usize = 32;

/// Configuration for the MonitorChannel
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Show raw hex dump of payloads
    pub show_hex: bool,
    /// Only show this request code (reads and writes)
    pub filter: Option<u8>,
}

impl MonitorConfig {
    /// Create config with hex output setting
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    /// Create config with request filter
    pub fn with_filter(mut self, request: Option<u8>) -> Self {
        self.filter = request;
        self
    }
}

/// Channel middleware that prints all requests and replies
pub struct MonitorChannel<C> {
    inner: C,
    config: MonitorConfig,
}

impl<C: ControlChannel> MonitorChannel<C> {
    /// Wrap a channel with printing middleware
    pub fn wrap(inner: C, config: MonitorConfig) -> Self {
        Self { inner, config }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn should_show(&self, request: u8) -> bool {
        self.config.filter.map_or(true, |r| r == request)
    }

    fn print_hex(&self, data: &[u8]) {
        if !self.config.show_hex || data.is_empty() {
            return;
        }
        // Trailing zero padding is noise in 4K batches
        let used = data.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        for (line, chunk) in data[..used].chunks(HEX_LINE).enumerate() {
            eprintln!("    {}  {:04x}: {:02x?}", "HEX".dim(), line * HEX_LINE, chunk);
        }
        if used < data.len() {
            eprintln!("    {}  ... {} zero bytes", "HEX".dim(), data.len() - used);
        }
    }
}

impl<C: ControlChannel> ControlChannel for MonitorChannel<C> {
    fn send(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
    ) -> Result<usize, TransportError> {
        let show = self.should_show(request);
        if show {
            eprintln!(
                "{} {}  0x{:02x} {} value=0x{:04x} index=0x{:04x} len={}",
                ">>>".cyan(),
                "OUT".cyan().bold(),
                request,
                req::write_name(request).yellow(),
                value,
                index,
                payload.len()
            );
            self.print_hex(payload);
        }

        let result = self.inner.send(request, value, index, payload);
        if show {
            if let Err(e) = &result {
                eprintln!("{} {}  {}", "<<<".red(), "ERR".red().bold(), e);
            }
        }
        result
    }

    fn receive(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let show = self.should_show(request);
        if show {
            eprintln!(
                "{} {}   0x{:02x} {} value=0x{:04x} index=0x{:04x} size={}",
                ">>>".cyan(),
                "IN".cyan().bold(),
                request,
                req::read_name(request).yellow(),
                value,
                index,
                size
            );
        }

        let result = self.inner.receive(request, value, index, size);
        if show {
            match &result {
                Ok(data) => {
                    eprintln!("{} {}  {} bytes", "<<<".green(), "RSP".green().bold(), data.len());
                    self.print_hex(data);
                }
                Err(e) => eprintln!("{} {}  {}", "<<<".red(), "ERR".red().bold(), e),
            }
        }
        result
    }
}
