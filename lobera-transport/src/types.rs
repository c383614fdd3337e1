//! Common types for transport layer

use std::fmt;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB bus number
    pub bus: u8,
    /// Device address on the bus
    pub address: u8,
    /// Product name if the string descriptor could be read
    pub product_name: Option<String>,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} bus {:03} addr {:03}",
            self.vid, self.pid, self.bus, self.address
        )?;
        if let Some(name) = &self.product_name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Per-request settle time demanded by the firmware
///
/// After a request completes, the next read may not start before
/// `read` has elapsed and the next write not before `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cooldown {
    pub read: std::time::Duration,
    pub write: std::time::Duration,
}

impl Cooldown {
    /// No settle time
    pub const NONE: Cooldown = Cooldown::from_millis(0, 0);

    pub const fn from_millis(read_ms: u64, write_ms: u64) -> Self {
        Self {
            read: std::time::Duration::from_millis(read_ms),
            write: std::time::Duration::from_millis(write_ms),
        }
    }

    /// Same settle time before the next read and the next write
    pub const fn both(ms: u64) -> Self {
        Self::from_millis(ms, ms)
    }

    /// Settle time only before the next write
    pub const fn write_only(ms: u64) -> Self {
        Self::from_millis(0, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cooldown_constructors() {
        assert_eq!(Cooldown::both(500).read, Duration::from_millis(500));
        assert_eq!(Cooldown::both(500).write, Duration::from_millis(500));
        assert_eq!(Cooldown::write_only(500).read, Duration::ZERO);
        assert_eq!(Cooldown::NONE, Cooldown::default());
    }

    #[test]
    fn test_device_info_display() {
        let info = DeviceInfo {
            vid: 0x195d,
            pid: 0x2033,
            bus: 1,
            address: 7,
            product_name: Some("Lobera".into()),
        };
        assert_eq!(info.to_string(), "195d:2033 bus 001 addr 007 (Lobera)");
    }
}
