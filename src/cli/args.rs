//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Tool locations; bare names are looked up in PATH
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the mediainfo binary
    #[arg(long, value_name = "PATH", env = "MKVSTRIP_MEDIAINFO", global = true)]
    pub mediainfo: Option<String>,

    /// Path to the mkvmerge binary
    #[arg(long, value_name = "PATH", env = "MKVSTRIP_MKVMERGE", global = true)]
    pub mkvmerge: Option<String>,

    /// Path to the mkvextract binary
    #[arg(long, value_name = "PATH", env = "MKVSTRIP_MKVEXTRACT", global = true)]
    pub mkvextract: Option<String>,

    /// Path to the mkvpropedit binary
    #[arg(long, value_name = "PATH", env = "MKVSTRIP_MKVPROPEDIT", global = true)]
    pub mkvpropedit: Option<String>,
}

/// Track selection options shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Comma-separated audio languages to keep, in priority order
    #[arg(
        short = 'l',
        long = "language",
        value_name = "LANGUAGE",
        value_delimiter = ',',
        env = "MKVSTRIP_LANGUAGES"
    )]
    pub languages: Vec<String>,

    /// Comma-separated subtitle languages to keep, in priority order
    #[arg(
        short = 's',
        long = "sub-language",
        value_name = "LANGUAGE",
        value_delimiter = ',',
        env = "MKVSTRIP_SUB_LANGUAGES"
    )]
    pub sub_languages: Vec<String>,

    /// Keep only forced subtitles
    #[arg(short = 'f', long, env = "MKVSTRIP_SUB_FORCED")]
    pub sub_forced: bool,

    /// Extract kept subtitles to external .srt files
    #[arg(short = 'e', long, env = "MKVSTRIP_EXTERNAL_SUBTITLES")]
    pub external_subtitles: bool,

    /// Directory for temporary remux output, created if missing
    #[arg(long, value_name = "PATH", env = "MKVSTRIP_TMP_DIR")]
    pub tmp_dir: Option<PathBuf>,
}

/// Arguments for the strip command
#[derive(Args, Debug)]
pub struct StripArgs {
    /// Media files or directories to process
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Minimum age in hours of files to process
    #[arg(long, value_name = "HOURS", env = "MKVSTRIP_MIN_AGE")]
    pub min_age: Option<u64>,

    /// Only log what would be done
    #[arg(short = 'd', long, env = "MKVSTRIP_DRY_RUN")]
    pub dry_run: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Media file to plan
    pub file: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Read track metadata from a saved `mediainfo --Output=JSON` document
    #[arg(long, value_name = "JSON")]
    pub probe_json: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub format: String,
}
