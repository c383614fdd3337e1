//! Query (read-only) command handlers.

use super::{open_keyboard, CommandResult};
use lobera_keyboard::ProfileColors;
use lobera_transport::{list_devices, MonitorConfig};

/// Show active profile and device status
pub fn info(monitor: Option<MonitorConfig>) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = keyboard.get_profile()?;
    let status = keyboard.get_status()?;
    println!("Profile:    {profile}");
    println!("Light mode: {}", status.light_mode);
    println!("Brightness: {}", status.brightness);
    println!(
        "NKRO:       {}",
        if status.full_nkro { "full" } else { "6-key" }
    );
    Ok(())
}

/// Get current profile
pub fn profile(monitor: Option<MonitorConfig>) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    println!("Profile: {}", keyboard.get_profile()?);
    Ok(())
}

/// Get the color slots of the active profile
pub fn colors(monitor: Option<MonitorConfig>) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = keyboard.get_profile()?;
    let colors = keyboard.get_profile_colors()?;
    println!("Profile {profile} colors:");
    print_colors(&colors);
    Ok(())
}

fn print_colors(colors: &ProfileColors) {
    for (slot, color) in colors.0.iter().enumerate() {
        println!("  {slot}: {color}");
    }
}

/// List connected keyboards
pub fn list() -> CommandResult {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No Lobera keyboards found");
        return Ok(());
    }
    for device in devices {
        println!("{device}");
    }
    Ok(())
}
