// Domain models - Core types and data structures

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Language code used for tracks with no language tag
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Codec IDs of plain-text subtitle formats
pub const TEXT_SUBTITLE_CODECS: &[&str] = &["S_TEXT/UTF8", "S_TEXT/ASCII"];

/// Prefix of the timing source tags that mediainfo reports for values
/// derived from container-level (General) metadata
const CONTAINER_SOURCE_PREFIX: &str = "General_";

/// Kind of elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl TrackKind {
    /// Kinds in declaration order, the order the container is expected to follow
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Audio, TrackKind::Subtitle];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One elementary stream within a container file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Position of the track within the container (mkvmerge track ID)
    pub stream_order: u32,
    /// Track number used by the property editor (`track:<id>`)
    pub track_id: u32,
    pub kind: TrackKind,
    /// Lowercase ISO 639 code, or "und"
    pub language: String,
    pub codec_id: Option<String>,
    pub format: Option<String>,
    pub forced: bool,
    pub title: Option<String>,
    /// Display name of the language (e.g. "English")
    pub language_name: Option<String>,
    /// Display name of the codec or profile (e.g. "Dolby Digital Plus")
    pub commercial_name: Option<String>,
    /// Stream size in bytes
    pub stream_size: Option<u64>,
    pub duration_source: Option<String>,
    /// Frame count source for video, sample count source for audio
    pub count_source: Option<String>,
}

impl Track {
    /// Create a track with no optional metadata and an undetermined language
    pub fn new(kind: TrackKind, stream_order: u32, track_id: u32) -> Self {
        Self {
            stream_order,
            track_id,
            kind,
            language: UNDETERMINED_LANGUAGE.to_string(),
            codec_id: None,
            format: None,
            forced: false,
            title: None,
            language_name: None,
            commercial_name: None,
            stream_size: None,
            duration_source: None,
            count_source: None,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = normalize_language(language);
        self
    }

    pub fn with_language_name(mut self, name: &str) -> Self {
        self.language_name = Some(name.to_string());
        self
    }

    pub fn with_codec(mut self, codec_id: &str) -> Self {
        self.codec_id = Some(codec_id.to_string());
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_commercial_name(mut self, name: &str) -> Self {
        self.commercial_name = Some(name.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn with_stream_size(mut self, size: u64) -> Self {
        self.stream_size = Some(size);
        self
    }

    pub fn with_timing_sources(mut self, duration: &str, count: &str) -> Self {
        self.duration_source = Some(duration.to_string());
        self.count_source = Some(count.to_string());
        self
    }

    /// Check whether the subtitle codec is a plain-text format.
    ///
    /// Fails with `InvalidInput` for a subtitle track without a codec ID,
    /// since the keep/remove decision cannot be made without it.
    pub fn is_text_subtitle(&self) -> Result<bool, DomainError> {
        match self.codec_id.as_deref() {
            Some(codec) => Ok(TEXT_SUBTITLE_CODECS.contains(&codec)),
            None => Err(DomainError::InvalidInput(format!(
                "{} track #{} has no codec ID",
                self.kind, self.stream_order
            ))),
        }
    }

    /// SDH detection is a title substring heuristic
    pub fn is_sdh(&self) -> bool {
        self.title
            .as_deref()
            .map(|title| title.to_lowercase().contains("sdh"))
            .unwrap_or(false)
    }

    pub fn display_language(&self) -> &str {
        self.language_name.as_deref().unwrap_or(&self.language)
    }

    /// Codec display name: commercial name, then format, then codec ID
    pub fn display_codec(&self) -> &str {
        self.commercial_name
            .as_deref()
            .or(self.format.as_deref())
            .or(self.codec_id.as_deref())
            .unwrap_or("")
    }

    /// True when neither the duration nor the frame/sample count of this
    /// track was derived from container-level metadata, meaning the values
    /// come from per-track statistics tags.
    pub fn has_track_level_statistics(&self) -> bool {
        !is_container_source(self.duration_source.as_deref())
            && !is_container_source(self.count_source.as_deref())
    }
}

fn is_container_source(source: Option<&str>) -> bool {
    source
        .map(|s| s.starts_with(CONTAINER_SOURCE_PREFIX))
        .unwrap_or(false)
}

/// Lowercase and trim a language tag, mapping an empty tag to "und"
pub fn normalize_language(language: &str) -> String {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        UNDETERMINED_LANGUAGE.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// Container-level (General track) metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub title: Option<String>,
    /// Attachment file names
    pub attachments: Vec<String>,
}

impl GeneralInfo {
    /// Parse the " / " separated attachment list reported by mediainfo
    pub fn parse_attachments(field: &str) -> Vec<String> {
        field
            .split(" / ")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A probed Matroska file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub general: GeneralInfo,
    pub video_tracks: Vec<Track>,
    pub audio_tracks: Vec<Track>,
    pub subtitle_tracks: Vec<Track>,
    /// Number of menu (chapter) tracks
    pub menu_tracks: usize,
}

impl MediaFile {
    /// Build a media file from probed tracks, partitioning them by kind.
    ///
    /// Relative order within each kind is preserved. Stream orders must be
    /// unique, since they double as merge-tool track IDs.
    pub fn new(
        path: impl Into<PathBuf>,
        general: GeneralInfo,
        tracks: Vec<Track>,
        menu_tracks: usize,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(DomainError::InvalidInput(format!(
                "Path has no file name: {}",
                path.display()
            )));
        }

        let mut seen = BTreeSet::new();
        for track in &tracks {
            if !seen.insert(track.stream_order) {
                return Err(DomainError::InvalidInput(format!(
                    "Duplicate stream order {} in {}",
                    track.stream_order,
                    path.display()
                )));
            }
        }

        let mut file = Self {
            path,
            general,
            video_tracks: Vec::new(),
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            menu_tracks,
        };

        for track in tracks {
            match track.kind {
                TrackKind::Video => file.video_tracks.push(track),
                TrackKind::Audio => file.audio_tracks.push(track),
                TrackKind::Subtitle => file.subtitle_tracks.push(track),
            }
        }

        Ok(file)
    }

    pub fn tracks(&self, kind: TrackKind) -> &[Track] {
        match kind {
            TrackKind::Video => &self.video_tracks,
            TrackKind::Audio => &self.audio_tracks,
            TrackKind::Subtitle => &self.subtitle_tracks,
        }
    }

    pub fn stream_orders(&self, kind: TrackKind) -> Vec<u32> {
        self.tracks(kind).iter().map(|t| t.stream_order).collect()
    }

    /// File name including extension
    pub fn filename(&self) -> String {
        file_name_of(&self.path)
    }

    /// File name without its extension
    pub fn filename_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn has_chapters(&self) -> bool {
        self.menu_tracks > 0
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
