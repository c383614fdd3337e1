//! Lobera keyboard configuration CLI

use clap::Parser;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let monitor = commands::create_monitor_config(cli.monitor, cli.hex, cli.filter.as_deref())?;

    match cli.command {
        // Default: show device info
        None | Some(Commands::Info) => commands::query::info(monitor)?,

        // === Query Commands ===
        Some(Commands::Profile) => commands::query::profile(monitor)?,
        Some(Commands::Colors) => commands::query::colors(monitor)?,
        Some(Commands::List) => commands::query::list()?,

        // === Setting Commands ===
        Some(Commands::SetProfile { profile }) => commands::set::set_profile(monitor, profile)?,
        Some(Commands::SetLight { mode }) => commands::set::set_light(monitor, mode)?,
        Some(Commands::SetColor { slot, color }) => {
            commands::set::set_color(monitor, slot, color)?
        }

        // === Thumb Button Macros ===
        Some(Commands::Macro { thumb, profile }) => {
            commands::macros::get_macro(monitor, profile, thumb)?
        }
        Some(Commands::SetMacro {
            thumb,
            sequence,
            profile,
        }) => commands::macros::set_macro(monitor, profile, thumb, &sequence)?,
        Some(Commands::ClearMacro { thumb, profile }) => {
            commands::macros::clear_macro(monitor, profile, thumb)?
        }

        // === Key Map ===
        Some(Commands::Keys { profile, json }) => commands::keys::get_keys(monitor, profile, json)?,
        Some(Commands::SetKeys { file, profile }) => {
            commands::keys::set_keys(monitor, profile, &file)?
        }
        Some(Commands::ClearKeys { profile }) => commands::keys::clear_keys(monitor, profile)?,

        // === Utility ===
        Some(Commands::Reset { yes }) => commands::set::reset(monitor, yes)?,
    }

    Ok(())
}

/// Log to stderr; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,lobera_driver=debug,lobera_keyboard=debug,lobera_transport=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
