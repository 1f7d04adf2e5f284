//! File name and title derivation
//!
//! Files are expected to be named like `Title (Year) [Quality].mkv`. The
//! canonical title is the part before the first bracketed annotation, and
//! processed files get an `[edited]` marker right after the first closing
//! bracket so later runs skip them.

use std::path::{Path, PathBuf};

use crate::domain::rules::ExtractionTag;

/// Marker inserted into the names of processed files
pub const EDITED_MARKER: &str = "[edited]";

/// Extension of extracted subtitle files
const SUBTITLE_EXTENSION: &str = "srt";

/// Extract the title prefix before the first bracketed annotation.
///
/// Trailing whitespace before the bracket is dropped. A name without any
/// `[`, or one that starts with a bracket, yields the whole stem (minus
/// trailing whitespace) so the title is never blank.
///
/// ```
/// use mkvstrip::planner::naming::canonical_title;
/// assert_eq!(canonical_title("Heat (1995) [1080p]"), "Heat (1995)");
/// assert_eq!(canonical_title("Heat (1995)"), "Heat (1995)");
/// assert_eq!(canonical_title("[Group] Heat"), "[Group] Heat");
/// ```
pub fn canonical_title(stem: &str) -> String {
    let prefix = match stem.find('[') {
        Some(index) => stem[..index].trim_end(),
        None => "",
    };
    if prefix.is_empty() {
        stem.trim_end().to_string()
    } else {
        prefix.to_string()
    }
}

/// Whether a path has already been processed
pub fn is_edited(path: &Path) -> bool {
    path.to_string_lossy().contains(EDITED_MARKER)
}

/// Insert the edited marker after the first `]` of a file name, or before
/// the extension when the name has no `]`.
pub fn edited_file_name(file_name: &str) -> String {
    if let Some(index) = file_name.find(']') {
        let (head, tail) = file_name.split_at(index + 1);
        return format!("{}{}{}", head, EDITED_MARKER, tail);
    }

    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = file_name.split_at(dot);
            format!("{}{}{}", stem, EDITED_MARKER, extension)
        }
        _ => format!("{}{}", file_name, EDITED_MARKER),
    }
}

/// Path of the processed file next to `path`
pub fn edited_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(edited_file_name(&file_name))
}

/// Destination of an extracted subtitle:
/// `<dir>/<edited stem>.<language><tag>.srt`
pub fn extraction_destination(source: &Path, language: &str, tag: ExtractionTag) -> PathBuf {
    let edited = edited_path(source);
    let stem = edited
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = format!("{}.{}{}.{}", stem, language, tag.suffix(), SUBTITLE_EXTENSION);
    source.with_file_name(file_name)
}

/// Temporary output of a remux: `<tmp_dir>/<file name>.tmp`, or
/// `<source>.tmp` next to the source
pub fn temporary_output(source: &Path, tmp_dir: Option<&Path>) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_name = format!("{}.tmp", file_name);
    match tmp_dir {
        Some(dir) => dir.join(tmp_name),
        None => source.with_file_name(tmp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_title() {
        assert_eq!(canonical_title("Alien (1979) [Bluray-1080p]"), "Alien (1979)");
        assert_eq!(canonical_title("Alien (1979)[x265]"), "Alien (1979)");
        assert_eq!(canonical_title("[Group] Alien"), "[Group] Alien");
        assert_eq!(canonical_title("Alien (1979)  "), "Alien (1979)");
    }

    #[test]
    fn test_edited_file_name() {
        assert_eq!(
            edited_file_name("Alien (1979) [1080p].mkv"),
            "Alien (1979) [1080p][edited].mkv"
        );
        assert_eq!(
            edited_file_name("Alien (1979) [1080p] [x265].mkv"),
            "Alien (1979) [1080p][edited] [x265].mkv"
        );
        assert_eq!(edited_file_name("Alien.mkv"), "Alien[edited].mkv");
        assert_eq!(edited_file_name("Alien"), "Alien[edited]");
    }

    #[test]
    fn test_is_edited() {
        assert!(is_edited(Path::new("/m/Alien [1080p][edited].mkv")));
        assert!(!is_edited(Path::new("/m/Alien [1080p].mkv")));
    }

    #[test]
    fn test_extraction_destination() {
        let source = Path::new("/media/Alien (1979) [1080p].mkv");
        assert_eq!(
            extraction_destination(source, "en", ExtractionTag::Forced),
            PathBuf::from("/media/Alien (1979) [1080p][edited].en.forced.srt")
        );
        assert_eq!(
            extraction_destination(source, "en", ExtractionTag::Plain(0)),
            PathBuf::from("/media/Alien (1979) [1080p][edited].en.srt")
        );
        assert_eq!(
            extraction_destination(source, "de", ExtractionTag::Plain(2)),
            PathBuf::from("/media/Alien (1979) [1080p][edited].de.2.srt")
        );
    }

    #[test]
    fn test_temporary_output() {
        let source = Path::new("/media/Alien [1080p].mkv");
        assert_eq!(
            temporary_output(source, None),
            PathBuf::from("/media/Alien [1080p].mkv.tmp")
        );
        assert_eq!(
            temporary_output(source, Some(Path::new("/scratch"))),
            PathBuf::from("/scratch/Alien [1080p].mkv.tmp")
        );
    }
}
