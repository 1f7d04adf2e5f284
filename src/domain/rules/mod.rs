// Domain rules - Track selection, alignment and naming policies

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{Track, TrackKind};
use crate::domain::policy::Policy;

/// Partition of one track kind into keep/remove/extract.
///
/// Every input track appears in exactly one of the three lists. `keep` is in
/// output order; `remove` and `extract` keep input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult<'a> {
    pub kind: TrackKind,
    pub keep: Vec<&'a Track>,
    pub remove: Vec<&'a Track>,
    pub extract: Vec<&'a Track>,
}

impl<'a> SelectionResult<'a> {
    fn empty(kind: TrackKind) -> Self {
        Self {
            kind,
            keep: Vec::new(),
            remove: Vec::new(),
            extract: Vec::new(),
        }
    }

    /// Whether applying this selection changes the track layout
    pub fn requires_remux(&self) -> bool {
        !self.remove.is_empty() || !self.extract.is_empty()
    }

    /// The default track of this kind, if any track is kept
    pub fn default_track(&self) -> Option<&'a Track> {
        self.keep.first().copied()
    }

    /// Check that keep/remove/extract is a total, disjoint partition of `input`
    pub fn verify_partition(&self, input: &[Track]) -> Result<(), DomainError> {
        let mut seen: BTreeMap<u32, &'static str> = BTreeMap::new();
        let lists = [
            ("keep", &self.keep),
            ("remove", &self.remove),
            ("extract", &self.extract),
        ];

        for (list_name, list) in lists {
            for track in list.iter() {
                if let Some(previous) = seen.insert(track.stream_order, list_name) {
                    return Err(DomainError::ConsistencyViolation(format!(
                        "{} track #{} selected as both {} and {}",
                        self.kind, track.stream_order, previous, list_name
                    )));
                }
            }
        }

        for track in input {
            if !seen.contains_key(&track.stream_order) {
                return Err(DomainError::ConsistencyViolation(format!(
                    "{} track #{} was not classified",
                    self.kind, track.stream_order
                )));
            }
        }

        if seen.len() != input.len() {
            return Err(DomainError::ConsistencyViolation(format!(
                "{} selection holds {} tracks but {} were given",
                self.kind,
                seen.len(),
                input.len()
            )));
        }

        Ok(())
    }

    /// Warning raised when the policy keeps nothing of this kind
    pub fn policy_violation(&self) -> Option<DomainError> {
        if self.keep.is_empty() && self.extract.is_empty() && !self.remove.is_empty() {
            Some(DomainError::PolicyViolation(format!(
                "no {} track matches the requested languages; all {} will be dropped",
                self.kind,
                self.remove.len()
            )))
        } else {
            None
        }
    }
}

/// Classification of a single track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Keep,
    Remove,
    Extract,
}

/// Language/forced based track selector for audio and subtitle tracks
pub struct TrackSelector;

impl TrackSelector {
    /// Partition `tracks` of the given kind according to `policy`.
    ///
    /// Audio is kept iff its language is listed. Subtitles additionally must
    /// be plain text, and forced when `forced_subtitles_only` is set; kept
    /// subtitles go to `extract` instead of `keep` when `external_subtitles`
    /// is set. Image based subtitle formats are always removed.
    pub fn select<'a>(
        tracks: &'a [Track],
        kind: TrackKind,
        policy: &Policy,
    ) -> Result<SelectionResult<'a>, DomainError> {
        if kind == TrackKind::Video {
            return Err(DomainError::InvalidInput(
                "video tracks are not subject to language selection".to_string(),
            ));
        }

        let mut result = SelectionResult::empty(kind);
        for track in tracks {
            if track.kind != kind {
                return Err(DomainError::InvalidInput(format!(
                    "{} track #{} passed to {} selection",
                    track.kind, track.stream_order, kind
                )));
            }

            let disposition = Self::classify(track, policy)?;
            debug!(
                kind = %kind,
                stream_order = track.stream_order,
                language = %track.language,
                ?disposition,
                "Classified track"
            );
            match disposition {
                Disposition::Keep => result.keep.push(track),
                Disposition::Remove => result.remove.push(track),
                Disposition::Extract => result.extract.push(track),
            }
        }

        result.keep = Self::order_keep(result.keep, kind, policy);
        result.verify_partition(tracks)?;

        if let Some(violation) = result.policy_violation() {
            warn!("{}", violation);
        }

        Ok(result)
    }

    fn classify(track: &Track, policy: &Policy) -> Result<Disposition, DomainError> {
        if !policy.keeps_language(track.kind, &track.language) {
            return Ok(Disposition::Remove);
        }

        if track.kind == TrackKind::Audio {
            return Ok(Disposition::Keep);
        }

        if !track.is_text_subtitle()? {
            return Ok(Disposition::Remove);
        }

        if policy.forced_subtitles_only && !track.forced {
            return Ok(Disposition::Remove);
        }

        if policy.external_subtitles {
            Ok(Disposition::Extract)
        } else {
            Ok(Disposition::Keep)
        }
    }

    /// Group kept tracks by policy language order, then sort each group:
    /// audio by descending stream size (unknown sizes last), subtitles
    /// forced first. Both sorts are stable.
    fn order_keep<'a>(keep: Vec<&'a Track>, kind: TrackKind, policy: &Policy) -> Vec<&'a Track> {
        let mut ordered = Vec::with_capacity(keep.len());

        for language in policy.languages(kind) {
            let mut group: Vec<&Track> = keep
                .iter()
                .copied()
                .filter(|track| &track.language == language)
                .collect();

            match kind {
                TrackKind::Audio => group.sort_by_key(|track| Reverse(track.stream_size)),
                _ => group.sort_by_key(|track| !track.forced),
            }

            ordered.extend(group);
        }

        ordered
    }
}

/// Suffix tag given to an extracted subtitle file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionTag {
    /// `.forced`
    Forced,
    /// `.hi`, for subtitles for the deaf and hard of hearing
    HearingImpaired,
    /// no suffix for the first plain subtitle, `.N` for the following ones
    Plain(u32),
}

impl ExtractionTag {
    pub fn suffix(&self) -> String {
        match self {
            ExtractionTag::Forced => ".forced".to_string(),
            ExtractionTag::HearingImpaired => ".hi".to_string(),
            ExtractionTag::Plain(0) => String::new(),
            ExtractionTag::Plain(n) => format!(".{}", n),
        }
    }
}

/// Assigns extraction tags to subtitles in iteration order.
///
/// Only one track can hold the forced tag and only one the hearing impaired
/// tag: the first forced track wins `.forced`; the first remaining track
/// with "sdh" in its title wins `.hi`; every other track is numbered. A
/// second forced track is therefore numbered (or tagged `.hi`), not tagged
/// `.forced`, so that no two extracted files share a name.
pub struct SubtitleTagger;

impl SubtitleTagger {
    pub fn assign(tracks: &[&Track]) -> Vec<ExtractionTag> {
        let mut forced_claimed = false;
        let mut sdh_claimed = false;
        let mut counter = 0;

        tracks
            .iter()
            .map(|track| {
                if track.forced && !forced_claimed {
                    forced_claimed = true;
                    ExtractionTag::Forced
                } else if track.is_sdh() && !sdh_claimed {
                    sdh_claimed = true;
                    ExtractionTag::HearingImpaired
                } else {
                    let tag = ExtractionTag::Plain(counter);
                    counter += 1;
                    tag
                }
            })
            .collect()
    }
}

/// A pair of stream orders that breaks declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Misalignment {
    pub earlier: TrackKind,
    pub earlier_order: u32,
    pub later: TrackKind,
    pub later_order: u32,
}

impl fmt::Display for Misalignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} track #{} is placed after {} track #{}",
            self.earlier, self.earlier_order, self.later, self.later_order
        )
    }
}

/// Detects containers whose track order does not follow video, audio,
/// subtitle declaration order
pub struct AlignmentChecker;

impl AlignmentChecker {
    /// Find the first violating pair, checking video/audio, video/subtitle
    /// then audio/subtitle. The check order only affects which pair is
    /// reported.
    pub fn find_misalignment(video: &[u32], audio: &[u32], subtitle: &[u32]) -> Option<Misalignment> {
        let pairs = [
            (TrackKind::Video, video, TrackKind::Audio, audio),
            (TrackKind::Video, video, TrackKind::Subtitle, subtitle),
            (TrackKind::Audio, audio, TrackKind::Subtitle, subtitle),
        ];

        for (earlier, earlier_orders, later, later_orders) in pairs {
            for &earlier_order in earlier_orders {
                if let Some(&later_order) = later_orders.iter().find(|&&o| earlier_order > o) {
                    return Some(Misalignment {
                        earlier,
                        earlier_order,
                        later,
                        later_order,
                    });
                }
            }
        }

        None
    }

    pub fn is_misaligned(video: &[u32], audio: &[u32], subtitle: &[u32]) -> bool {
        Self::find_misalignment(video, audio, subtitle).is_some()
    }
}

/// Track title conventions
pub struct TrackNaming;

impl TrackNaming {
    /// Audio tracks are named after their codec
    pub fn audio_name(track: &Track) -> String {
        track.display_codec().to_string()
    }

    /// Subtitles are named after their language, with "(Forced)" and
    /// "(SDH)" markers
    pub fn subtitle_name(track: &Track) -> String {
        let mut name = track.display_language().to_string();
        if track.forced {
            name.push_str(" (Forced)");
        }
        if track.is_sdh() {
            name.push_str(" (SDH)");
        }
        name
    }

    pub fn name_for(track: &Track) -> String {
        match track.kind {
            TrackKind::Video => String::new(),
            TrackKind::Audio => Self::audio_name(track),
            TrackKind::Subtitle => Self::subtitle_name(track),
        }
    }
}
