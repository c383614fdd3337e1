//! Thumb button macro command handlers.

use super::{open_keyboard, resolve_profile, CommandResult};
use lobera_driver::hid;
use lobera_driver::macro_seq::MacroSeq;
use lobera_keyboard::{Macro, MacroEntry};
use lobera_transport::MonitorConfig;

/// Show a thumb button macro
pub fn get_macro(monitor: Option<MonitorConfig>, profile: Option<u8>, thumb: u8) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = resolve_profile(&mut keyboard, profile)?;
    let enabled = keyboard.get_thumb_enabled(profile, thumb)?;
    let entries = keyboard.get_thumb_macro(profile, thumb)?;

    println!(
        "Profile {profile} thumb {thumb}: {}",
        if enabled { "enabled" } else { "disabled" }
    );
    if entries.is_empty() {
        println!("Macro is empty");
        return Ok(());
    }
    print_entries(&entries);
    println!("\nSequence: {}", MacroSeq::from_entries(&entries));
    Ok(())
}

/// Print one line per macro entry
pub fn print_entries(entries: &Macro) {
    println!("Events ({}):", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match *entry {
            MacroEntry::KeyDown(code) => {
                println!("  {i:3}: ↓ {} (0x{code:02x})", hid::key_name(code))
            }
            MacroEntry::KeyUp(code) => {
                println!("  {i:3}: ↑ {} (0x{code:02x})", hid::key_name(code))
            }
            MacroEntry::Sleep(ms) => println!("  {i:3}: sleep {ms}ms"),
            MacroEntry::Repeat(n) => println!("  {i:3}: repeat x{n}"),
        }
    }
}

/// Set a thumb button macro from sequence text
pub fn set_macro(
    monitor: Option<MonitorConfig>,
    profile: Option<u8>,
    thumb: u8,
    sequence: &str,
) -> CommandResult {
    let seq: MacroSeq = sequence.parse()?;
    let entries = seq.to_entries();

    let mut keyboard = open_keyboard(monitor)?;
    let profile = resolve_profile(&mut keyboard, profile)?;
    keyboard.set_thumb_macro(profile, thumb, &entries)?;
    println!(
        "Profile {profile} thumb {thumb} set to: {seq} ({} events)",
        entries.len()
    );
    Ok(())
}

/// Clear and disable a thumb button macro
pub fn clear_macro(monitor: Option<MonitorConfig>, profile: Option<u8>, thumb: u8) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = resolve_profile(&mut keyboard, profile)?;
    keyboard.set_thumb_macro(profile, thumb, &[])?;
    println!("Profile {profile} thumb {thumb} cleared");
    Ok(())
}
