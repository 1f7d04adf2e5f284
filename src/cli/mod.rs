//! CLI module for mkvstrip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{PlanArgs, PolicyArgs, StripArgs, ToolArgs};

/// mkvstrip
///
/// Strips unwanted audio and subtitle tracks from Matroska files and cleans
/// up their metadata using MKVToolNix.
#[derive(Parser, Debug)]
#[command(name = "mkvstrip")]
#[command(about = "Strips unwanted tracks from MKV files and cleans them up")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MKVSTRIP_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(
        long,
        default_value = "text",
        value_parser = ["text", "json"],
        env = "MKVSTRIP_LOG_FORMAT",
        global = true
    )]
    pub log_format: String,

    /// Debug logging, including every generated command line
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (default: $MKVSTRIP_CONFIG, then the XDG config
    /// directory, then ./mkvstrip.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Strip and clean every MKV file found under the given paths
    Strip(StripArgs),
    /// Print the edit plan for one file without changing anything
    Plan(PlanArgs),
}
