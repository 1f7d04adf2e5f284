//! Remux vs. cleanup decision and plan construction

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaFile, TrackKind};
use crate::domain::policy::Policy;
use crate::domain::rules::{AlignmentChecker, Misalignment, SelectionResult, TrackSelector};
use crate::planner::{cleanup, remux, EditPlan};

/// Options that affect plan construction but not track selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    /// Directory for temporary remux output; next to the source when unset
    pub tmp_dir: Option<PathBuf>,
}

/// Selection and alignment results for one file.
///
/// Computed once per file and handed to the plan builders, so results are
/// never shared between files.
#[derive(Debug, Clone)]
pub struct FileAnalysis<'a> {
    pub file: &'a MediaFile,
    pub audio: SelectionResult<'a>,
    pub subtitles: SelectionResult<'a>,
    pub misalignment: Option<Misalignment>,
}

impl<'a> FileAnalysis<'a> {
    pub fn analyze(file: &'a MediaFile, policy: &Policy) -> Result<Self, DomainError> {
        let audio = TrackSelector::select(&file.audio_tracks, TrackKind::Audio, policy)?;
        let subtitles = TrackSelector::select(&file.subtitle_tracks, TrackKind::Subtitle, policy)?;

        let misalignment = AlignmentChecker::find_misalignment(
            &file.stream_orders(TrackKind::Video),
            &file.stream_orders(TrackKind::Audio),
            &file.stream_orders(TrackKind::Subtitle),
        );
        if let Some(found) = &misalignment {
            warn!("Misaligned streams detected in {}: {}", file.filename(), found);
        }

        Ok(Self {
            file,
            audio,
            subtitles,
            misalignment,
        })
    }

    pub fn needs_remux(&self) -> bool {
        needs_remux(&self.audio, &self.subtitles, self.misalignment.is_some())
    }
}

/// A full remux is needed iff something is removed or extracted, or the
/// track order is misaligned
pub fn needs_remux(audio: &SelectionResult, subtitles: &SelectionResult, misaligned: bool) -> bool {
    audio.requires_remux() || subtitles.requires_remux() || misaligned
}

/// Builds the edit plan for a file
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    options: PlanOptions,
}

impl PlanBuilder {
    pub fn new(options: PlanOptions) -> Self {
        Self { options }
    }

    /// Build the plan for `file`. Deterministic: the same file and policy
    /// always produce the same plan.
    pub fn build(&self, file: &MediaFile, policy: &Policy) -> Result<EditPlan, DomainError> {
        let analysis = FileAnalysis::analyze(file, policy)?;
        self.build_from(&analysis)
    }

    pub fn build_from(&self, analysis: &FileAnalysis) -> Result<EditPlan, DomainError> {
        if analysis.needs_remux() {
            let plan = remux::build(analysis, self.options.tmp_dir.as_deref())?;
            info!(
                "Remux planned for {}: keeping {} audio, {} subtitle track(s), removing {}, extracting {}",
                analysis.file.filename(),
                plan.audio.tracks().len(),
                plan.subtitles.tracks().len(),
                plan.removed.len(),
                plan.extractions.len()
            );
            Ok(EditPlan::Remux(plan))
        } else {
            let plan = cleanup::build(analysis.file);
            debug!(
                "Cleanup planned for {} with {} edit(s)",
                analysis.file.filename(),
                plan.edit_count()
            );
            Ok(EditPlan::Cleanup(plan))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GeneralInfo, Track};

    fn file(tracks: Vec<Track>) -> MediaFile {
        MediaFile::new("/m/Film (2000) [1080p].mkv", GeneralInfo::default(), tracks, 0).unwrap()
    }

    fn policy(external: bool) -> Policy {
        Policy::new(["en"], ["en"], false, external).unwrap()
    }

    fn base_tracks() -> Vec<Track> {
        vec![
            Track::new(TrackKind::Video, 0, 1),
            Track::new(TrackKind::Audio, 1, 2).with_language("en"),
            Track::new(TrackKind::Subtitle, 2, 3)
                .with_language("en")
                .with_codec("S_TEXT/UTF8"),
        ]
    }

    #[test]
    fn test_clean_aligned_file_needs_no_remux() {
        let file = file(base_tracks());
        let analysis = FileAnalysis::analyze(&file, &policy(false)).unwrap();
        assert!(!analysis.needs_remux());
    }

    #[test]
    fn test_removal_forces_remux() {
        let mut tracks = base_tracks();
        tracks.push(Track::new(TrackKind::Audio, 3, 4).with_language("de"));
        let file = file(tracks);
        let analysis = FileAnalysis::analyze(&file, &policy(false)).unwrap();
        assert!(analysis.needs_remux());
    }

    #[test]
    fn test_extraction_forces_remux() {
        let file = file(base_tracks());
        let analysis = FileAnalysis::analyze(&file, &policy(true)).unwrap();
        assert!(analysis.needs_remux());
    }

    #[test]
    fn test_misalignment_forces_remux() {
        let tracks = vec![
            Track::new(TrackKind::Video, 0, 1),
            Track::new(TrackKind::Audio, 2, 2).with_language("en"),
            Track::new(TrackKind::Subtitle, 1, 3)
                .with_language("en")
                .with_codec("S_TEXT/UTF8"),
        ];
        let file = file(tracks);
        let analysis = FileAnalysis::analyze(&file, &policy(false)).unwrap();
        assert!(analysis.misalignment.is_some());
        assert!(analysis.needs_remux());

        let plan = PlanBuilder::default().build(&file, &policy(false)).unwrap();
        assert!(plan.is_remux());
    }

    #[test]
    fn test_builder_is_deterministic() {
        let mut tracks = base_tracks();
        tracks.push(Track::new(TrackKind::Audio, 3, 4).with_language("en").with_stream_size(9));
        let file = file(tracks);
        let builder = PlanBuilder::new(PlanOptions {
            tmp_dir: Some(PathBuf::from("/tmp/strip")),
        });

        let first = builder.build(&file, &policy(true)).unwrap();
        let second = builder.build(&file, &policy(true)).unwrap();
        assert_eq!(first, second);
    }
}
