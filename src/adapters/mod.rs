// Adapters - External system implementations

pub mod exec_dry_run;
pub mod exec_mkvtoolnix;
pub mod fs_local;
pub mod probe_mediainfo;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_dry_run::DryRunExecutor;
pub use exec_mkvtoolnix::{MkvToolNixExecutor, MkvToolNixPaths, ToolCommand};
pub use fs_local::LocalFsAdapter;
pub use probe_mediainfo::{MediaInfoProbe, SavedProbe};
pub use toml_config::Settings;
