//! Key map command handlers.

use super::{open_keyboard, resolve_profile, CommandResult};
use lobera_driver::hid;
use lobera_driver::keys_file::KeyMapFile;
use lobera_driver::macro_seq::MacroSeq;
use lobera_keyboard::{KeyAction, KeysSettings};
use lobera_transport::MonitorConfig;
use std::path::Path;

/// Show the key map of a profile
pub fn get_keys(monitor: Option<MonitorConfig>, profile: Option<u8>, json: bool) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = resolve_profile(&mut keyboard, profile)?;
    let settings = keyboard.get_profile_buttons(profile)?;

    if json {
        println!("{}", KeyMapFile::from_settings(&settings).to_json()?);
        return Ok(());
    }

    if settings.is_empty() {
        println!("Profile {profile}: no remapped keys");
        return Ok(());
    }
    println!("Profile {profile}: {} remapped keys", settings.len());
    for (&code, setting) in &settings {
        let action = match &setting.action {
            KeyAction::Disable => "disabled".to_string(),
            KeyAction::Substitute(to) => format!("-> {}", hid::key_label(*to)),
            KeyAction::Macro(m) => format!("macro {}", MacroSeq::from_entries(m)),
        };
        println!(
            "  {:<10} {action} [{:?}]",
            hid::key_label(code),
            setting.repeat
        );
    }
    Ok(())
}

/// Write a key map file to a profile
pub fn set_keys(monitor: Option<MonitorConfig>, profile: Option<u8>, file: &Path) -> CommandResult {
    let settings = KeyMapFile::load(file)?.to_settings()?;
    write_keys(monitor, profile, &settings)
}

/// Remove every remapping from a profile
pub fn clear_keys(monitor: Option<MonitorConfig>, profile: Option<u8>) -> CommandResult {
    write_keys(monitor, profile, &KeysSettings::new())
}

fn write_keys(
    monitor: Option<MonitorConfig>,
    profile: Option<u8>,
    settings: &KeysSettings,
) -> CommandResult {
    let mut keyboard = open_keyboard(monitor)?;
    let profile = resolve_profile(&mut keyboard, profile)?;
    println!(
        "Writing {} keys to profile {profile} (this takes a while)...",
        settings.len()
    );
    keyboard.set_profile_buttons(profile, settings)?;
    println!("Done");
    Ok(())
}
