// TOML config adapter - Settings file discovery and tool resolution

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::exec_mkvtoolnix::MkvToolNixPaths;
use crate::domain::errors::*;

/// Environment variable naming an explicit settings file
pub const CONFIG_ENV: &str = "MKVSTRIP_CONFIG";

const APP_DIR: &str = "mkvstrip";
const LOCAL_FILE: &str = "mkvstrip.toml";

/// Contents of `mkvstrip.toml`. Every field is optional; CLI flags and
/// `MKVSTRIP_*` variables take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tools: ToolSettings,
    pub policy: PolicySettings,
    pub run: RunSettings,
}

/// `[tools]`: binary names or paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub mediainfo: String,
    pub mkvmerge: String,
    pub mkvextract: String,
    pub mkvpropedit: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            mediainfo: "mediainfo".to_string(),
            mkvmerge: "mkvmerge".to_string(),
            mkvextract: "mkvextract".to_string(),
            mkvpropedit: "mkvpropedit".to_string(),
        }
    }
}

impl ToolSettings {
    pub fn resolve_mediainfo(&self) -> Result<PathBuf, DomainError> {
        resolve_tool(&self.mediainfo)
    }

    pub fn resolve_mkvtoolnix(&self) -> Result<MkvToolNixPaths, DomainError> {
        Ok(MkvToolNixPaths {
            mkvmerge: resolve_tool(&self.mkvmerge)?,
            mkvextract: resolve_tool(&self.mkvextract)?,
            mkvpropedit: resolve_tool(&self.mkvpropedit)?,
        })
    }

    /// The configured names, unresolved
    pub fn configured_mkvtoolnix(&self) -> MkvToolNixPaths {
        MkvToolNixPaths {
            mkvmerge: PathBuf::from(&self.mkvmerge),
            mkvextract: PathBuf::from(&self.mkvextract),
            mkvpropedit: PathBuf::from(&self.mkvpropedit),
        }
    }
}

/// `[policy]`: track selection defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    pub audio_languages: Vec<String>,
    pub subtitle_languages: Vec<String>,
    pub forced_only: bool,
    pub external_subtitles: bool,
}

/// `[run]`: processing options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub tmp_dir: Option<PathBuf>,
    pub min_age_hours: u64,
    pub dry_run: bool,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            DomainError::ConfigError(msg) => {
                DomainError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load settings from the first existing candidate. An explicit path
    /// must exist; without one, a missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), DomainError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DomainError::ConfigError(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            info!("Using configuration from {}", path.display());
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        for candidate in config_candidates() {
            if candidate.is_file() {
                info!("Using configuration from {}", candidate.display());
                let settings = Self::from_file(&candidate)?;
                return Ok((settings, Some(candidate)));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok((Self::default(), None))
    }
}

/// Settings file candidates in lookup order
pub fn config_candidates() -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    let mut push_unique = |path: PathBuf| {
        if !path.as_os_str().is_empty() && seen.insert(path.clone()) {
            out.push(path);
        }
    };

    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        push_unique(PathBuf::from(path));
    }
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        push_unique(PathBuf::from(xdg).join(APP_DIR).join("config.toml"));
    }
    if let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) {
        push_unique(PathBuf::from(home).join(".config").join(APP_DIR).join("config.toml"));
    }
    push_unique(PathBuf::from(LOCAL_FILE));

    out
}

/// Resolve a tool given as a bare name through `PATH`; explicit paths are
/// taken as they are but must exist
pub fn resolve_tool(name_or_path: &str) -> Result<PathBuf, DomainError> {
    let candidate = Path::new(name_or_path);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(DomainError::ConfigError(format!(
            "Tool not found at {}",
            candidate.display()
        )));
    }

    which::which(name_or_path).map_err(|e| {
        DomainError::ConfigError(format!("Tool '{}' not found in PATH: {}", name_or_path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tools.mkvmerge, "mkvmerge");
        assert_eq!(settings.run.min_age_hours, 0);
        assert!(settings.policy.audio_languages.is_empty());
    }

    #[test]
    fn test_full_file() {
        let settings = Settings::from_toml_str(
            r#"
            [tools]
            mkvmerge = "/opt/mkvtoolnix/mkvmerge"

            [policy]
            audio_languages = ["en", "ja"]
            subtitle_languages = ["en"]
            forced_only = true

            [run]
            tmp_dir = "/scratch"
            min_age_hours = 12
            dry_run = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.tools.mkvmerge, "/opt/mkvtoolnix/mkvmerge");
        assert_eq!(settings.tools.mediainfo, "mediainfo");
        assert_eq!(settings.policy.audio_languages, vec!["en", "ja"]);
        assert!(settings.policy.forced_only);
        assert!(!settings.policy.external_subtitles);
        assert_eq!(settings.run.tmp_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(settings.run.min_age_hours, 12);
        assert!(settings.run.dry_run);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Settings::from_toml_str("[run]\nthreads = 4\n");
        assert!(matches!(result, Err(DomainError::ConfigError(_))));
    }

    #[test]
    fn test_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[run]\nmin_age_hours = 3\n").unwrap();

        let (settings, source) = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.run.min_age_hours, 3);
        assert_eq!(source, Some(path));

        let missing = dir.path().join("missing.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_local_file_is_last_candidate() {
        let candidates = config_candidates();
        assert_eq!(candidates.last(), Some(&PathBuf::from(LOCAL_FILE)));
    }

    #[test]
    fn test_resolve_tool_explicit_path() {
        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("mkvmerge");
        fs::write(&tool, b"").unwrap();

        assert_eq!(resolve_tool(tool.to_str().unwrap()).unwrap(), tool);
        let missing = dir.path().join("mkvextract");
        assert!(resolve_tool(missing.to_str().unwrap()).is_err());
        assert!(resolve_tool("definitely-not-a-real-tool-xyz").is_err());
    }
}
