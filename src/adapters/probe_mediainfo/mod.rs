//! mediainfo adapter for track probing
//!
//! Runs `mediainfo --Output=JSON` and maps the `media.track` array onto the
//! track model. Saved JSON documents can be parsed the same way, which is
//! how plans are built without the tool installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Deserializer};
use tracing::{debug, trace};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const TOOL: &str = "mediainfo";

#[derive(Debug, Deserialize)]
struct MediaInfoDocument {
    media: Option<MediaInfoMedia>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoMedia {
    #[serde(default)]
    track: Vec<RawTrack>,
}

/// One entry of `media.track`. mediainfo reports every value as a string.
#[derive(Debug, Default, Deserialize)]
struct RawTrack {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "StreamOrder", default, deserialize_with = "lenient_string")]
    stream_order: Option<String>,
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "Language", default, deserialize_with = "lenient_string")]
    language: Option<String>,
    #[serde(rename = "Language_String", default, deserialize_with = "lenient_string")]
    language_name: Option<String>,
    #[serde(rename = "CodecID", default, deserialize_with = "lenient_string")]
    codec_id: Option<String>,
    #[serde(rename = "Format", default, deserialize_with = "lenient_string")]
    format: Option<String>,
    #[serde(rename = "Format_Commercial_IfAny", default, deserialize_with = "lenient_string")]
    commercial_if_any: Option<String>,
    #[serde(rename = "Format_Commercial", default, deserialize_with = "lenient_string")]
    commercial: Option<String>,
    #[serde(rename = "Forced", default, deserialize_with = "lenient_string")]
    forced: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(rename = "StreamSize", default, deserialize_with = "lenient_string")]
    stream_size: Option<String>,
    #[serde(rename = "Duration_Source", default, deserialize_with = "lenient_string")]
    duration_source: Option<String>,
    #[serde(rename = "FrameCount_Source", default, deserialize_with = "lenient_string")]
    frame_count_source: Option<String>,
    #[serde(rename = "SamplingCount_Source", default, deserialize_with = "lenient_string")]
    sampling_count_source: Option<String>,
    #[serde(rename = "Attachments", default, deserialize_with = "lenient_string")]
    attachments: Option<String>,
}

/// Accept strings and bare numbers alike; empty strings become `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(if b { "Yes" } else { "No" }.to_string()),
        _ => None,
    })
}

/// mediainfo-based probe adapter
pub struct MediaInfoProbe {
    binary: PathBuf,
}

impl MediaInfoProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Parse a mediainfo JSON document describing the file at `path`
    pub fn from_json_str(json: &str, path: &Path) -> Result<MediaFile, DomainError> {
        let document: MediaInfoDocument = serde_json::from_str(json).map_err(|e| {
            DomainError::InvalidInput(format!(
                "Unreadable mediainfo output for {}: {}",
                path.display(),
                e
            ))
        })?;

        let raw_tracks = document.media.map(|m| m.track).unwrap_or_default();

        let mut general = GeneralInfo::default();
        let mut tracks = Vec::new();
        let mut menu_tracks = 0;

        for raw in raw_tracks {
            match raw.kind.as_str() {
                "General" => {
                    general.title = raw.title;
                    general.attachments = raw
                        .attachments
                        .as_deref()
                        .map(GeneralInfo::parse_attachments)
                        .unwrap_or_default();
                }
                "Video" => tracks.push(map_track(raw, TrackKind::Video)?),
                "Audio" => tracks.push(map_track(raw, TrackKind::Audio)?),
                "Text" => tracks.push(map_track(raw, TrackKind::Subtitle)?),
                "Menu" => menu_tracks += 1,
                other => trace!("Ignoring {} track in {}", other, path.display()),
            }
        }

        let file = MediaFile::new(path, general, tracks, menu_tracks)?;
        debug!(
            "Probed {}: {} video, {} audio, {} subtitle, {} menu track(s)",
            file.filename(),
            file.video_tracks.len(),
            file.audio_tracks.len(),
            file.subtitle_tracks.len(),
            file.menu_tracks
        );
        Ok(file)
    }

    /// Parse a saved mediainfo JSON file describing the file at `path`
    pub fn from_json_file(json_path: &Path, path: &Path) -> Result<MediaFile, DomainError> {
        let json = fs::read_to_string(json_path).map_err(|e| {
            DomainError::FsFailure(format!(
                "Failed to read probe document {}: {}",
                json_path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json, path)
    }
}

impl ProbePort for MediaInfoProbe {
    fn probe(&self, path: &Path) -> Result<MediaFile, DomainError> {
        debug!("Running {} on {}", self.binary.display(), path.display());

        let output = Command::new(&self.binary)
            .arg("--Output=JSON")
            .arg(path)
            .output()
            .map_err(|e| DomainError::tool(TOOL, format!("failed to spawn: {}", e)))?;

        if !output.status.success() {
            return Err(DomainError::tool(
                TOOL,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Self::from_json_str(&String::from_utf8_lossy(&output.stdout), path)
    }
}

/// Probe adapter that answers every request from one saved document
pub struct SavedProbe {
    document: PathBuf,
}

impl SavedProbe {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl ProbePort for SavedProbe {
    fn probe(&self, path: &Path) -> Result<MediaFile, DomainError> {
        MediaInfoProbe::from_json_file(&self.document, path)
    }
}

fn map_track(raw: RawTrack, kind: TrackKind) -> Result<Track, DomainError> {
    let stream_order = parse_number::<u32>(raw.stream_order.as_deref(), "StreamOrder", kind)?;
    let track_id = parse_number::<u32>(raw.id.as_deref(), "ID", kind)?;

    let mut track = Track::new(kind, stream_order, track_id);
    if let Some(language) = raw.language.as_deref() {
        track = track.with_language(language);
    }
    track.language_name = raw.language_name;
    track.codec_id = raw.codec_id;
    track.format = raw.format;
    track.commercial_name = raw.commercial_if_any.or(raw.commercial);
    track.forced = raw
        .forced
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    track.title = raw.title;
    track.stream_size = raw.stream_size.as_deref().and_then(|s| s.trim().parse().ok());
    track.duration_source = raw.duration_source;
    track.count_source = match kind {
        TrackKind::Audio => raw.sampling_count_source,
        _ => raw.frame_count_source,
    };

    if kind == TrackKind::Subtitle && track.codec_id.is_none() {
        return Err(DomainError::InvalidInput(format!(
            "subtitle track #{} has no codec ID",
            stream_order
        )));
    }

    Ok(track)
}

fn parse_number<T: std::str::FromStr>(
    value: Option<&str>,
    field: &str,
    kind: TrackKind,
) -> Result<T, DomainError> {
    let value = value.ok_or_else(|| {
        DomainError::InvalidInput(format!("{} track without {}", kind, field))
    })?;
    value.trim().parse().map_err(|_| {
        DomainError::InvalidInput(format!("{} track has invalid {} '{}'", kind, field, value))
    })
}
