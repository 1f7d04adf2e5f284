//! Edit planning: turns a probed file and a policy into remux or cleanup
//! instructions for the MKVToolNix tools

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::rules::{ExtractionTag, Misalignment};

pub mod cleanup;
pub mod naming;
pub mod remux;
pub mod strategy;

pub use strategy::{FileAnalysis, PlanBuilder, PlanOptions};

/// The edit to apply to one file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditPlan {
    /// Rebuild the container with a new track set and order
    Remux(RemuxPlan),
    /// Edit metadata in place
    Cleanup(CleanupPlan),
}

impl EditPlan {
    pub fn source(&self) -> &PathBuf {
        match self {
            EditPlan::Remux(plan) => &plan.source,
            EditPlan::Cleanup(plan) => &plan.source,
        }
    }

    pub fn is_remux(&self) -> bool {
        matches!(self, EditPlan::Remux(_))
    }
}

/// A track carried into the remuxed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTrack {
    pub stream_order: u32,
    pub language: String,
    /// Track name to set; empty blanks the name
    pub name: String,
    /// Language to force on the track, if any
    pub language_override: Option<String>,
    /// Default flag; `None` leaves the flag untouched
    pub default: Option<bool>,
}

/// Tracks of one kind carried into the remuxed file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "tracks", rename_all = "snake_case")]
pub enum TrackSet {
    /// Keep exactly these tracks, in this order
    Keep(Vec<PlannedTrack>),
    /// Drop every track of this kind
    DropAll,
}

impl TrackSet {
    pub fn tracks(&self) -> &[PlannedTrack] {
        match self {
            TrackSet::Keep(tracks) => tracks,
            TrackSet::DropAll => &[],
        }
    }
}

/// A subtitle written to an external file before the remux
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionTarget {
    pub stream_order: u32,
    pub language: String,
    pub tag: ExtractionTag,
    pub destination: PathBuf,
}

/// Full rebuild of the container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemuxPlan {
    pub source: PathBuf,
    /// Temporary output that replaces `source` on success
    pub output: PathBuf,
    pub title: String,
    pub video: Vec<PlannedTrack>,
    pub audio: TrackSet,
    pub subtitles: TrackSet,
    pub extractions: Vec<ExtractionTarget>,
    /// Stream orders of the dropped audio and subtitle tracks
    pub removed: Vec<u32>,
    /// Output track order, as source stream orders
    pub track_order: Vec<u32>,
    /// The misalignment that forced this remux, if any
    pub misalignment: Option<Misalignment>,
}

/// One metadata edit on a single track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum TrackEdit {
    DeleteName { track_id: u32 },
    SetName { track_id: u32, name: String },
    SetLanguage { track_id: u32, language: String },
}

/// In-place metadata cleanup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupPlan {
    pub source: PathBuf,
    pub track_edits: Vec<TrackEdit>,
    /// New container title, when it differs from the canonical one
    pub title: Option<String>,
    pub attachment_deletions: Vec<String>,
    pub delete_chapters: bool,
    pub delete_statistics_tags: bool,
}

/// Render a program and its arguments as one shell-like line; empty
/// arguments and arguments with whitespace are quoted
pub fn command_line<I, S>(program: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.as_ref();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

impl CleanupPlan {
    /// An empty plan means the file is already clean; no tool needs to run
    pub fn is_empty(&self) -> bool {
        self.track_edits.is_empty()
            && self.title.is_none()
            && self.attachment_deletions.is_empty()
            && !self.delete_chapters
            && !self.delete_statistics_tags
    }

    pub fn edit_count(&self) -> usize {
        self.track_edits.len()
            + usize::from(self.title.is_some())
            + self.attachment_deletions.len()
            + usize::from(self.delete_chapters)
            + usize::from(self.delete_statistics_tags)
    }
}
