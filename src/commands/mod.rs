//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (info, profile, colors, list)
//! - `set`: Setting commands (set-profile, set-light, set-color, reset)
//! - `macros`: Thumb button macro commands (macro, set-macro, clear-macro)
//! - `keys`: Key map commands (keys, set-keys, clear-keys)

pub mod keys;
pub mod macros;
pub mod query;
pub mod set;

use anyhow::{bail, Context};
use lobera_keyboard::KeyboardInterface;
use lobera_transport::protocol::req;
use lobera_transport::{BoxedChannel, MonitorChannel, MonitorConfig, UsbChannel};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Keyboard handle used by every command
pub type Keyboard = KeyboardInterface<BoxedChannel>;

/// Open the first supported keyboard.
/// If `monitor` is Some, the channel is wrapped so all traffic is printed.
pub fn open_keyboard(monitor: Option<MonitorConfig>) -> anyhow::Result<Keyboard> {
    let channel = UsbChannel::open_any().context("No Lobera keyboard found")?;
    println!("Device: {}", channel.device_info());

    let channel: BoxedChannel = match monitor {
        Some(config) => Box::new(MonitorChannel::wrap(channel, config)),
        None => Box::new(channel),
    };
    Ok(KeyboardInterface::new(channel))
}

/// Profile given on the command line, or the active one
pub fn resolve_profile(keyboard: &mut Keyboard, profile: Option<u8>) -> anyhow::Result<u8> {
    match profile {
        Some(p) => Ok(p),
        None => Ok(keyboard.get_profile()?),
    }
}

/// Create monitor config from CLI args
pub fn create_monitor_config(
    monitor: bool,
    hex: bool,
    filter: Option<&str>,
) -> anyhow::Result<Option<MonitorConfig>> {
    if !monitor {
        return Ok(None);
    }

    let filter = filter.map(parse_request_filter).transpose()?;
    Ok(Some(
        MonitorConfig::default().with_hex(hex).with_filter(filter),
    ))
}

/// Parse a request code given as a number (`0x88`, `136`) or by name
/// (`get_key_offsets`)
pub fn parse_request_filter(s: &str) -> anyhow::Result<u8> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    };
    if let Some(code) = parsed {
        return Ok(code);
    }

    let wanted = s.to_ascii_uppercase();
    if let Some(code) =
        (0..=u8::MAX).find(|&c| req::read_name(c) == wanted || req::write_name(c) == wanted)
    {
        return Ok(code);
    }
    bail!("Unknown request filter \"{s}\" (use a code like 0x11 or a name like get_key_offsets)")
}
