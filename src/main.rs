//! mkvstrip
//!
//! Strips unwanted audio and subtitle tracks from Matroska files and cleans
//! up their metadata.
//!
//! # Usage
//!
//! ```bash
//! mkvstrip strip -l en,ja -s en /media/movies
//! mkvstrip strip -l en -s en -f --dry-run "Heat (1995) [1080p].mkv"
//! mkvstrip plan -l en -s en --format json "Heat (1995) [1080p].mkv"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mkvstrip::adapters::toml_config::Settings;
use mkvstrip::adapters::tracing_log;
use mkvstrip::cli::{commands, Cli, Commands};
use mkvstrip::ports::{LogFormat, LogLevel};

/// Main entry point for the mkvstrip CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::parse(&cli.log_level)?
    };
    tracing_log::init(level, LogFormat::parse(&cli.log_format)?)?;

    info!("Starting mkvstrip {}", env!("CARGO_PKG_VERSION"));

    let (settings, _source) =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Strip(args) => commands::strip(&settings, &cli.tools, args),
        Commands::Plan(args) => commands::plan(&settings, &cli.tools, args),
    }
}
