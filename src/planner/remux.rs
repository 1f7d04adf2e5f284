//! Remux plan construction and mkvmerge/mkvextract argument lists

use std::path::Path;

use tracing::info;

use crate::domain::errors::DomainError;
use crate::domain::model::{Track, UNDETERMINED_LANGUAGE};
use crate::domain::rules::{SelectionResult, SubtitleTagger, TrackNaming};
use crate::planner::naming::{canonical_title, extraction_destination, temporary_output};
use crate::planner::strategy::FileAnalysis;
use crate::planner::{ExtractionTarget, PlannedTrack, RemuxPlan, TrackSet};

/// Build the remux plan from a file analysis
pub fn build(analysis: &FileAnalysis, tmp_dir: Option<&Path>) -> Result<RemuxPlan, DomainError> {
    let file = analysis.file;

    let video: Vec<PlannedTrack> = file
        .video_tracks
        .iter()
        .map(|track| PlannedTrack {
            stream_order: track.stream_order,
            language: track.language.clone(),
            name: String::new(),
            language_override: Some(UNDETERMINED_LANGUAGE.to_string()),
            default: None,
        })
        .collect();

    let audio = track_set(&analysis.audio);
    let subtitles = track_set(&analysis.subtitles);

    let mut track_order: Vec<u32> = video.iter().map(|t| t.stream_order).collect();
    track_order.extend(audio.tracks().iter().map(|t| t.stream_order));
    track_order.extend(subtitles.tracks().iter().map(|t| t.stream_order));

    let tags = SubtitleTagger::assign(&analysis.subtitles.extract);
    let extractions = analysis
        .subtitles
        .extract
        .iter()
        .zip(tags)
        .map(|(track, tag)| ExtractionTarget {
            stream_order: track.stream_order,
            language: track.language.clone(),
            tag,
            destination: extraction_destination(&file.path, &track.language, tag),
        })
        .collect();

    let removed = analysis
        .audio
        .remove
        .iter()
        .chain(analysis.subtitles.remove.iter())
        .map(|t| t.stream_order)
        .collect();

    let plan = RemuxPlan {
        source: file.path.clone(),
        output: temporary_output(&file.path, tmp_dir),
        title: canonical_title(&file.filename_stem()),
        video,
        audio,
        subtitles,
        extractions,
        removed,
        track_order,
        misalignment: analysis.misalignment,
    };
    plan.validate()?;

    log_selection(&analysis.audio);
    log_selection(&analysis.subtitles);

    Ok(plan)
}

/// Kept tracks in selector order; the first one becomes the default track
fn track_set(selection: &SelectionResult) -> TrackSet {
    let default = match selection.default_track() {
        Some(track) => track.stream_order,
        None => return TrackSet::DropAll,
    };

    let tracks = selection
        .keep
        .iter()
        .map(|track| planned(track, track.stream_order == default))
        .collect();
    TrackSet::Keep(tracks)
}

fn planned(track: &Track, default: bool) -> PlannedTrack {
    PlannedTrack {
        stream_order: track.stream_order,
        language: track.language.clone(),
        name: TrackNaming::name_for(track),
        language_override: None,
        default: Some(default),
    }
}

fn log_selection(selection: &SelectionResult) {
    let describe = |tracks: &[&Track]| -> String {
        tracks
            .iter()
            .map(|t| format!("#{} {} {}", t.stream_order, t.language, t.display_codec()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    if !selection.keep.is_empty() {
        info!("Retaining {} track(s): {}", selection.kind, describe(&selection.keep));
    }
    if !selection.extract.is_empty() {
        info!("Extracting {} track(s): {}", selection.kind, describe(&selection.extract));
    }
    if !selection.remove.is_empty() {
        info!("Removing {} track(s): {}", selection.kind, describe(&selection.remove));
    }
}

impl RemuxPlan {
    /// Each source track may appear at most once in the output order
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut sorted = self.track_order.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(DomainError::ConsistencyViolation(format!(
                "track order {} lists a track twice",
                self.track_order_string()
            )));
        }
        Ok(())
    }

    /// Track order in mkvmerge syntax: `0:<order>,0:<order>,...`
    pub fn track_order_string(&self) -> String {
        self.track_order
            .iter()
            .map(|order| format!("0:{}", order))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Arguments for mkvmerge, without the program name
    pub fn to_merge_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--output".into(),
            path_arg(&self.output),
            "--title".into(),
            self.title.clone(),
            "--no-chapters".into(),
            "--no-attachments".into(),
            "--no-track-tags".into(),
            "--disable-track-statistics-tags".into(),
        ];

        for track in &self.video {
            push_track_args(&mut args, track);
        }

        for (set, include_flag, exclude_flag) in [
            (&self.audio, "--audio-tracks", "--no-audio"),
            (&self.subtitles, "--subtitle-tracks", "--no-subtitles"),
        ] {
            match set {
                TrackSet::Keep(tracks) => {
                    for track in tracks {
                        push_track_args(&mut args, track);
                    }
                    let ids = tracks
                        .iter()
                        .map(|t| t.stream_order.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    args.push(include_flag.into());
                    args.push(ids);
                }
                TrackSet::DropAll => args.push(exclude_flag.into()),
            }
        }

        args.push("--track-order".into());
        args.push(self.track_order_string());
        args.push(path_arg(&self.source));
        args
    }

    /// Arguments for mkvextract, or `None` when nothing is extracted
    pub fn to_extract_args(&self) -> Option<Vec<String>> {
        if self.extractions.is_empty() {
            return None;
        }

        let mut args = vec![path_arg(&self.source), "tracks".to_string()];
        args.extend(
            self.extractions
                .iter()
                .map(|target| format!("{}:{}", target.stream_order, path_arg(&target.destination))),
        );
        Some(args)
    }
}

fn push_track_args(args: &mut Vec<String>, track: &PlannedTrack) {
    if let Some(default) = track.default {
        args.push("--default-track".into());
        args.push(format!("{}:{}", track.stream_order, if default { 1 } else { 0 }));
    }
    args.push("--track-name".into());
    args.push(format!("{}:{}", track.stream_order, track.name));
    if let Some(language) = &track.language_override {
        args.push("--language".into());
        args.push(format!("{}:{}", track.stream_order, language));
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
