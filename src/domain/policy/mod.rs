//! User policy: which languages to keep and how subtitles are handled

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::{normalize_language, TrackKind};

/// Immutable selection policy passed to every selection and planning function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Audio languages to keep; list order is output priority
    pub audio_languages: Vec<String>,
    /// Subtitle languages to keep; list order is output priority
    pub subtitle_languages: Vec<String>,
    /// Keep only subtitles flagged as forced
    pub forced_subtitles_only: bool,
    /// Extract kept subtitles to external .srt files instead of muxing them
    pub external_subtitles: bool,
}

impl Policy {
    /// Create a validated policy.
    ///
    /// Language codes are trimmed and lowercased; duplicates are dropped
    /// keeping the first occurrence. At least one audio language is required.
    /// An empty subtitle list is allowed and removes every subtitle.
    pub fn new<A, S>(
        audio_languages: A,
        subtitle_languages: S,
        forced_subtitles_only: bool,
        external_subtitles: bool,
    ) -> Result<Self, DomainError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let audio_languages = normalize_list(audio_languages)?;
        let subtitle_languages = normalize_list(subtitle_languages)?;

        if audio_languages.is_empty() {
            return Err(DomainError::InvalidInput(
                "At least one audio language must be given".to_string(),
            ));
        }

        Ok(Self {
            audio_languages,
            subtitle_languages,
            forced_subtitles_only,
            external_subtitles,
        })
    }

    /// Ordered languages to keep for a track kind. Video tracks are never
    /// filtered by language, so the list is empty for them.
    pub fn languages(&self, kind: TrackKind) -> &[String] {
        match kind {
            TrackKind::Audio => &self.audio_languages,
            TrackKind::Subtitle => &self.subtitle_languages,
            TrackKind::Video => &[],
        }
    }

    pub fn keeps_language(&self, kind: TrackKind, language: &str) -> bool {
        self.languages(kind).iter().any(|l| l == language)
    }
}

/// Split comma separated entries, normalize and deduplicate
fn normalize_list<I>(languages: I) -> Result<Vec<String>, DomainError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in languages {
        for raw in entry.as_ref().split(',') {
            if raw.trim().is_empty() {
                continue;
            }
            let code = normalize_language(raw);
            validate_code(&code)?;
            if !out.contains(&code) {
                out.push(code);
            }
        }
    }
    Ok(out)
}

/// ISO 639-1/2 codes are two or three ASCII letters, optionally followed by
/// a region subtag as in "pt-br"
fn validate_code(code: &str) -> Result<(), DomainError> {
    let mut parts = code.split('-');
    let primary = parts.next().unwrap_or_default();
    let valid = (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_lowercase())
        && parts.all(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()));
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "Invalid language code '{}'. Expected an ISO 639 code such as 'en' or 'eng'",
            code
        )))
    }
}
