//! Setting command handlers.

use super::{open_keyboard, CommandResult};
use anyhow::bail;
use lobera_keyboard::{LightMode, RgbColor};
use lobera_transport::MonitorConfig;

/// Switch the active profile
pub fn set_profile(monitor: Option<MonitorConfig>, profile: u8) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    keyboard.set_profile(profile)?;
    println!("Profile set to {profile}");
    Ok(())
}

/// Set the backlight mode
pub fn set_light(monitor: Option<MonitorConfig>, mode: LightMode) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    keyboard.set_light_mode(mode)?;
    println!("Light mode set to {mode}");
    Ok(())
}

/// Set one color slot of the active profile
pub fn set_color(monitor: Option<MonitorConfig>, slot: u8, color: RgbColor) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    keyboard.set_profile_color(slot, color)?;
    println!("Color {slot} set to {color}");
    Ok(())
}

/// Restore factory defaults
pub fn reset(monitor: Option<MonitorConfig>, confirmed: bool) -> CommandResult {
    if !confirmed {
        bail!("Reset erases every key map, macro and color; re-run with --yes to confirm");
    }
    let mut keyboard = open_keyboard(monitor)?;
    println!("Resetting configuration (this takes a while)...");
    keyboard.reset_config()?;
    println!("Configuration reset to defaults");
    Ok(())
}
