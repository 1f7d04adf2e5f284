// Local filesystem adapter - Discovery and file finalization

use std::fs::{self, FileTimes, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::planner::naming::{edited_file_name, edited_path, is_edited};
use crate::ports::*;

const MKV_EXTENSION: &str = "mkv";

/// Local filesystem adapter
#[derive(Debug, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn is_mkv(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MKV_EXTENSION))
            .unwrap_or(false)
    }

    /// Whether the file passes the edited-marker and minimum-age filters
    fn is_candidate(path: &Path, options: &DiscoveryOptions, now: DateTime<Utc>) -> Result<bool, DomainError> {
        if is_edited(path) {
            info!("Ignoring {}: file has already been edited", path.display());
            return Ok(false);
        }

        if options.min_age_hours > 0 {
            let modified: DateTime<Utc> = fs::metadata(path)
                .and_then(|m| m.modified())
                .map_err(|e| fs_error("read modification time of", path, e))?
                .into();
            let min_age = Duration::hours(options.min_age_hours as i64);
            if now.signed_duration_since(modified) < min_age {
                info!(
                    "Ignoring {}: modified less than {} hour(s) ago",
                    path.display(),
                    options.min_age_hours
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Move `from` to `to`, copying when a rename is not possible (for
    /// example across filesystems)
    fn move_file(from: &Path, to: &Path) -> Result<(), DomainError> {
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        fs::copy(from, to).map_err(|e| fs_error("copy", from, e))?;
        fs::remove_file(from).map_err(|e| fs_error("remove", from, e))?;
        Ok(())
    }

    fn copy_times(from: &Path, to: &Path) -> Result<(), DomainError> {
        let metadata = fs::metadata(from).map_err(|e| fs_error("read metadata of", from, e))?;
        let mut times = FileTimes::new();
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }

        let file = OpenOptions::new()
            .write(true)
            .open(to)
            .map_err(|e| fs_error("open", to, e))?;
        file.set_times(times)
            .map_err(|e| fs_error("set timestamps of", to, e))
    }

    /// Mark the `.srt` files next to `media` that share its stem. Failures
    /// are logged and do not affect the media file.
    fn rename_sidecars(media: &Path) {
        let (Some(dir), Some(stem)) = (media.parent(), media.file_stem()) else {
            return;
        };
        let stem = stem.to_string_lossy().to_lowercase();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {} for subtitles: {}", dir.display(), e);
                return;
            }
        };

        let mut sidecars: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                let lower = name.to_lowercase();
                lower.ends_with(".srt") && lower.starts_with(&stem) && !is_edited(Path::new(name))
            })
            .collect();
        sidecars.sort();

        for name in sidecars {
            let from = dir.join(&name);
            let to = dir.join(edited_file_name(&name));
            match fs::rename(&from, &to) {
                Ok(()) => info!("Renamed {} => {}", from.display(), to.display()),
                Err(e) => warn!("Could not rename {}: {}", from.display(), e),
            }
        }
    }
}

fn fs_error(action: &str, path: &Path, error: std::io::Error) -> DomainError {
    DomainError::FsFailure(format!("Failed to {} {}: {}", action, path.display(), error))
}

impl FsPort for LocalFsAdapter {
    fn discover(&self, path: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>, DomainError> {
        let now = Utc::now();

        if path.is_file() {
            if !Self::is_mkv(path) {
                return Err(DomainError::InvalidInput(format!(
                    "Given file is not a valid mkv file: {}",
                    path.display()
                )));
            }
            return Ok(if Self::is_candidate(path, options, now)? {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        if !path.is_dir() {
            return Err(DomainError::FsFailure(format!(
                "No such file or directory: {}",
                path.display()
            )));
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.map_err(|e| {
                DomainError::FsFailure(format!("Failed to walk {}: {}", path.display(), e))
            })?;
            if entry.file_type().is_file() && Self::is_mkv(entry.path()) {
                found.push(entry.into_path());
            }
        }

        // Directory by directory, files by name within each directory
        found.sort_by(|a, b| (a.parent(), a.file_name()).cmp(&(b.parent(), b.file_name())));

        let mut files = Vec::with_capacity(found.len());
        for candidate in found {
            if Self::is_candidate(&candidate, options, now)? {
                files.push(candidate);
            }
        }

        debug!("Discovered {} file(s) under {}", files.len(), path.display());
        Ok(files)
    }

    fn prepare_tmp_dir(&self, dir: &Path) -> Result<(), DomainError> {
        fs::create_dir_all(dir).map_err(|e| fs_error("create directory", dir, e))
    }

    fn replace_original(&self, temp: &Path, original: &Path) -> Result<PathBuf, DomainError> {
        let target = edited_path(original);

        // The original stays until its replacement is in place
        if let Err(e) = Self::move_file(temp, &target) {
            warn!("Could not move {} into place, keeping {}", temp.display(), original.display());
            let _ = fs::remove_file(temp);
            return Err(e);
        }
        info!("Renamed {} => {}", temp.display(), target.display());

        Self::copy_times(original, &target)?;

        fs::remove_file(original).map_err(|e| fs_error("delete", original, e))?;
        info!("Deleted {}", original.display());

        Self::rename_sidecars(original);
        Ok(target)
    }

    fn mark_processed(&self, path: &Path) -> Result<PathBuf, DomainError> {
        let target = edited_path(path);
        fs::rename(path, &target).map_err(|e| fs_error("rename", path, e))?;
        info!("Renamed {} => {}", path.display(), target.display());
        Self::rename_sidecars(path);
        Ok(target)
    }

    fn discard_temp(&self, temp: &Path) -> Result<(), DomainError> {
        if temp.exists() {
            fs::remove_file(temp).map_err(|e| fs_error("remove", temp, e))?;
            debug!("Removed temporary output {}", temp.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration as StdDuration, SystemTime};

    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"mkv").unwrap();
        path
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.mkv");
        touch(dir.path(), "A.MKV");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "Done [1080p][edited].mkv");
        touch(dir.path(), "sub/c.mkv");
        touch(dir.path(), "z.mkv");

        let adapter = LocalFsAdapter::new();
        let files = adapter.discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["A.MKV", "b.mkv", "z.mkv", "sub/c.mkv"]);
    }

    #[test]
    fn test_discover_explicit_file() {
        let dir = TempDir::new().unwrap();
        let mkv = touch(dir.path(), "film.mkv");
        let txt = touch(dir.path(), "film.txt");
        let adapter = LocalFsAdapter::new();

        assert_eq!(adapter.discover(&mkv, &DiscoveryOptions::default()).unwrap(), vec![mkv]);
        assert!(matches!(
            adapter.discover(&txt, &DiscoveryOptions::default()),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            adapter.discover(&dir.path().join("missing.mkv"), &DiscoveryOptions::default()),
            Err(DomainError::FsFailure(_))
        ));
    }

    #[test]
    fn test_min_age_skips_fresh_files() {
        let dir = TempDir::new().unwrap();
        let mkv = touch(dir.path(), "fresh.mkv");
        let adapter = LocalFsAdapter::new();
        let options = DiscoveryOptions { min_age_hours: 2 };
        assert!(adapter.discover(&mkv, &options).unwrap().is_empty());

        let old = SystemTime::now() - StdDuration::from_secs(3 * 3600);
        let file = OpenOptions::new().write(true).open(&mkv).unwrap();
        file.set_times(FileTimes::new().set_modified(old)).unwrap();
        assert_eq!(adapter.discover(&mkv, &options).unwrap(), vec![mkv]);
    }

    #[test]
    fn test_replace_original_keeps_timestamps() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "Film (2001) [720p].mkv");
        let temp = touch(dir.path(), "scratch/Film (2001) [720p].mkv.tmp");

        let stamp = SystemTime::UNIX_EPOCH + StdDuration::from_secs(1_600_000_000);
        OpenOptions::new()
            .write(true)
            .open(&original)
            .unwrap()
            .set_times(FileTimes::new().set_modified(stamp).set_accessed(stamp))
            .unwrap();

        let adapter = LocalFsAdapter::new();
        let result = adapter.replace_original(&temp, &original).unwrap();

        assert_eq!(result, dir.path().join("Film (2001) [720p][edited].mkv"));
        assert!(!original.exists());
        assert!(!temp.exists());
        assert_eq!(fs::metadata(&result).unwrap().modified().unwrap(), stamp);
    }

    #[test]
    fn test_replace_original_keeps_original_when_target_blocked() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "Film (2001) [720p].mkv");
        let temp = touch(dir.path(), "scratch/Film (2001) [720p].mkv.tmp");
        // A non-empty directory where the edited file should go
        touch(dir.path(), "Film (2001) [720p][edited].mkv/occupied");

        let adapter = LocalFsAdapter::new();
        let result = adapter.replace_original(&temp, &original);

        assert!(matches!(result, Err(DomainError::FsFailure(_))));
        assert!(original.exists());
        assert_eq!(fs::read(&original).unwrap(), b"mkv");
        assert!(!temp.exists());
    }

    #[test]
    fn test_replace_original_marks_subtitle_sidecars() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "Film (2001) [720p].mkv");
        let temp = touch(dir.path(), "scratch/Film (2001) [720p].mkv.tmp");
        touch(dir.path(), "Film (2001) [720p].en.srt");
        touch(dir.path(), "film (2001) [720p].de.forced.SRT");
        touch(dir.path(), "Film (2001) [720p][edited].fr.srt");
        touch(dir.path(), "Other (1999) [720p].en.srt");

        let adapter = LocalFsAdapter::new();
        adapter.replace_original(&temp, &original).unwrap();

        let mut entries: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name != "scratch")
            .collect();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                "Film (2001) [720p][edited].en.srt",
                "Film (2001) [720p][edited].fr.srt",
                "Film (2001) [720p][edited].mkv",
                "Other (1999) [720p].en.srt",
                "film (2001) [720p][edited].de.forced.SRT",
            ]
        );
    }

    #[test]
    fn test_mark_processed_marks_subtitle_sidecars() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "Clean (2002) [720p].mkv");
        touch(dir.path(), "Clean (2002) [720p].en.srt");
        touch(dir.path(), "Clean (2002) [720p].en.ass");

        LocalFsAdapter::new().mark_processed(&file).unwrap();

        assert!(dir.path().join("Clean (2002) [720p][edited].en.srt").exists());
        assert!(!dir.path().join("Clean (2002) [720p].en.srt").exists());
        assert!(dir.path().join("Clean (2002) [720p].en.ass").exists());
    }

    #[test]
    fn test_mark_processed_and_discard_temp() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "Clean.mkv");
        let adapter = LocalFsAdapter::new();

        let renamed = adapter.mark_processed(&file).unwrap();
        assert_eq!(renamed, dir.path().join("Clean[edited].mkv"));
        assert!(renamed.exists());

        let temp = touch(dir.path(), "x.mkv.tmp");
        adapter.discard_temp(&temp).unwrap();
        assert!(!temp.exists());
        adapter.discard_temp(&temp).unwrap();
    }
}
