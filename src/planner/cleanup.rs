//! In-place metadata cleanup plan and mkvpropedit argument list

use crate::domain::model::{MediaFile, Track, UNDETERMINED_LANGUAGE};
use crate::domain::rules::TrackNaming;
use crate::planner::naming::canonical_title;
use crate::planner::{CleanupPlan, TrackEdit};

/// Build the cleanup plan for a file that keeps its track layout.
///
/// Only edits that change something are scheduled; an already clean file
/// yields an empty plan.
pub fn build(file: &MediaFile) -> CleanupPlan {
    let mut track_edits = Vec::new();

    for track in &file.video_tracks {
        if track.title.is_some() {
            track_edits.push(TrackEdit::DeleteName {
                track_id: track.track_id,
            });
        }
        if track.language != UNDETERMINED_LANGUAGE {
            track_edits.push(TrackEdit::SetLanguage {
                track_id: track.track_id,
                language: UNDETERMINED_LANGUAGE.to_string(),
            });
        }
    }

    for track in file.audio_tracks.iter().chain(file.subtitle_tracks.iter()) {
        let name = TrackNaming::name_for(track);
        if current_title(track) != name {
            track_edits.push(TrackEdit::SetName {
                track_id: track.track_id,
                name,
            });
        }
    }

    let canonical = canonical_title(&file.filename_stem());
    let title = if file.general.title.as_deref().unwrap_or("") != canonical {
        Some(canonical)
    } else {
        None
    };

    let delete_statistics_tags = file
        .video_tracks
        .iter()
        .chain(file.audio_tracks.iter())
        .any(Track::has_track_level_statistics);

    CleanupPlan {
        source: file.path.clone(),
        track_edits,
        title,
        attachment_deletions: file.general.attachments.clone(),
        delete_chapters: file.has_chapters(),
        delete_statistics_tags,
    }
}

fn current_title(track: &Track) -> &str {
    track.title.as_deref().unwrap_or("")
}

impl CleanupPlan {
    /// Arguments for mkvpropedit, without the program name
    pub fn to_propedit_args(&self) -> Vec<String> {
        let mut args = vec![self.source.to_string_lossy().to_string()];

        for edit in &self.track_edits {
            match edit {
                TrackEdit::DeleteName { track_id } => {
                    args.extend(track_selector(*track_id));
                    args.push("--delete".into());
                    args.push("name".into());
                }
                TrackEdit::SetLanguage { track_id, language } => {
                    args.extend(track_selector(*track_id));
                    args.push("--set".into());
                    args.push(format!("language={}", language));
                }
                TrackEdit::SetName { track_id, name } => {
                    args.extend(track_selector(*track_id));
                    args.push("--set".into());
                    args.push(format!("name={}", name));
                }
            }
        }

        if let Some(title) = &self.title {
            args.push("--edit".into());
            args.push("info".into());
            args.push("--set".into());
            args.push(format!("title={}", title));
        }

        for attachment in &self.attachment_deletions {
            args.push("--delete-attachment".into());
            args.push(format!("name:{}", attachment));
        }

        if self.delete_chapters {
            args.push("--chapters".into());
            args.push(String::new());
        }

        if self.delete_statistics_tags {
            args.push("--delete-track-statistics-tags".into());
        }

        args
    }
}

fn track_selector(track_id: u32) -> [String; 2] {
    ["--edit".to_string(), format!("track:{}", track_id)]
}
