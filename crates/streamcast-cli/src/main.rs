//! StreamCast CLI - Stream parameter and player configuration toolkit
//!
//! Features:
//! - Resolve a `liveurl` value the way the player page does
//! - List the quality variants derived from a locator
//! - Preview a quality switch
//! - Print and validate player configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// StreamCast CLI - Live stream player toolkit
#[derive(Parser)]
#[command(name = "streamcast")]
#[command(version)]
#[command(about = "Inspect StreamCast stream parameters and player configuration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    json_logs: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a `liveurl` value and list its quality variants
    Inspect {
        /// Raw parameter value: URL or base64-encoded URL
        param: String,

        /// Player configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the locator a quality switch would load
    Switch {
        /// Currently loaded locator
        locator: String,

        /// Target quality label (e.g. 360p)
        label: String,

        /// Player configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a configuration preset, or validate a configuration file
    Config {
        /// Preset name (live, vod)
        #[arg(short, long, default_value = "live")]
        preset: String,

        /// Validate this file instead of printing a preset
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Inspect { param, config } => {
            commands::inspect(&param, config.as_deref(), &cli.format)?;
        }
        Commands::Switch { locator, label, config } => {
            commands::switch(&locator, &label, config.as_deref(), &cli.format)?;
        }
        Commands::Config { preset, check } => {
            commands::config(&preset, check.as_deref())?;
        }
    }

    Ok(())
}
