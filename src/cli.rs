// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lobera")]
#[command(author, version, about = "Lobera keyboard configuration tool")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print every control request and reply
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump of payloads (with --monitor)
    #[arg(long, global = true)]
    pub hex: bool,

    /// Only monitor one request code, e.g. 0x88 or get_key_offsets
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Enable debug logging for the driver crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// Show device, active profile and status
    #[command(visible_aliases = ["status", "i"])]
    Info,

    /// Get the active profile (1-5)
    #[command(visible_aliases = ["prof", "p"])]
    Profile,

    /// Get the six colors of the active profile
    #[command(visible_alias = "c")]
    Colors,

    /// List connected Lobera keyboards
    #[command(visible_alias = "ls")]
    List,

    // === Setting Commands ===
    /// Switch the active profile
    #[command(visible_alias = "sp")]
    SetProfile {
        /// Profile number (1-5)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: u8,
    },

    /// Set the backlight mode (off, single, dim, loop)
    #[command(visible_alias = "sl")]
    SetLight {
        mode: lobera_keyboard::LightMode,
    },

    /// Set one color slot of the active profile
    #[command(visible_alias = "sc")]
    SetColor {
        /// Color slot (0-5)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        slot: u8,
        /// Color as rrggbb, #rrggbb or 0xrrggbb
        color: lobera_keyboard::RgbColor,
    },

    // === Thumb Button Macros ===
    /// Show a thumb button macro
    #[command(visible_alias = "m")]
    Macro {
        /// Thumb button (1-3)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        thumb: u8,
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
    },

    /// Set a thumb button macro
    ///
    /// Sequence syntax: comma-separated steps. `A` taps a key,
    /// `LCtrl+C` presses a combo, `A:down` / `A:up` press or release,
    /// `50ms` sleeps and `x3` repeats the whole macro.
    #[command(visible_alias = "sm")]
    SetMacro {
        /// Thumb button (1-3)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        thumb: u8,
        /// Macro sequence
        sequence: String,
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
    },

    /// Clear (and disable) a thumb button macro
    #[command(visible_alias = "cm")]
    ClearMacro {
        /// Thumb button (1-3)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        thumb: u8,
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
    },

    // === Key Map ===
    /// Show the key map of a profile
    #[command(visible_alias = "k")]
    Keys {
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
        /// Print as a JSON key map file
        #[arg(long)]
        json: bool,
    },

    /// Write a key map file to a profile
    #[command(visible_alias = "sk")]
    SetKeys {
        /// JSON key map file
        file: PathBuf,
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
    },

    /// Remove every remapping and macro from a profile
    #[command(visible_alias = "ck")]
    ClearKeys {
        /// Profile (default: active profile)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        profile: Option<u8>,
    },

    // === Utility ===
    /// Restore factory defaults for every profile
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}
