// Plan interactor - Builds and renders the edit plan for one file

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::policy::Policy;
use crate::error::StripResult;
use crate::planner::{
    command_line, CleanupPlan, EditPlan, PlanBuilder, PlanOptions, RemuxPlan, TrackEdit, TrackSet,
};
use crate::ports::*;

/// Output format of a rendered plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl PlanFormat {
    pub fn parse(format: &str) -> Result<Self, DomainError> {
        match format.to_lowercase().as_str() {
            "text" => Ok(PlanFormat::Text),
            "json" => Ok(PlanFormat::Json),
            "yaml" | "yml" => Ok(PlanFormat::Yaml),
            _ => Err(DomainError::InvalidInput(format!(
                "Invalid plan format: {}. Valid formats: text, json, yaml",
                format
            ))),
        }
    }
}

/// Request for planning a single file
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub path: PathBuf,
    pub policy: Policy,
    pub plan_options: PlanOptions,
    pub format: PlanFormat,
}

/// Response with the plan and its rendering
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub plan: EditPlan,
    #[serde(skip)]
    pub rendered: String,
}

/// Interactor for the plan use case
pub struct PlanInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl PlanInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    pub fn execute(&self, request: &PlanRequest) -> StripResult<PlanResponse> {
        let file = self.probe_port.probe(&request.path)?;
        let plan = PlanBuilder::new(request.plan_options.clone()).build(&file, &request.policy)?;
        let rendered = render(&plan, request.format)?;
        Ok(PlanResponse { plan, rendered })
    }
}

/// Render a plan in the requested format
pub fn render(plan: &EditPlan, format: PlanFormat) -> StripResult<String> {
    match format {
        PlanFormat::Text => Ok(render_text(plan)),
        PlanFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
        PlanFormat::Yaml => Ok(serde_yaml::to_string(plan)?),
    }
}

fn render_text(plan: &EditPlan) -> String {
    match plan {
        EditPlan::Remux(remux) => render_remux(remux),
        EditPlan::Cleanup(cleanup) => render_cleanup(cleanup),
    }
}

fn render_remux(plan: &RemuxPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File:        {}", plan.source.display());
    let _ = writeln!(out, "Action:      remux");
    let _ = writeln!(out, "Output:      {}", plan.output.display());
    let _ = writeln!(out, "Title:       {}", plan.title);
    if let Some(misalignment) = &plan.misalignment {
        let _ = writeln!(out, "Misaligned:  {}", misalignment);
    }

    let video: Vec<String> = plan.video.iter().map(|t| format!("#{}", t.stream_order)).collect();
    let _ = writeln!(out, "Video:       {} (name cleared, language und)", video.join(", "));

    for (label, set) in [("Audio:", &plan.audio), ("Subtitles:", &plan.subtitles)] {
        let _ = write!(out, "{:<13}", label);
        match set {
            TrackSet::DropAll => {
                let _ = writeln!(out, "drop all");
            }
            TrackSet::Keep(tracks) => {
                let kept: Vec<String> = tracks
                    .iter()
                    .map(|t| {
                        let default = if t.default == Some(true) { ", default" } else { "" };
                        format!("#{} {} \"{}\"{}", t.stream_order, t.language, t.name, default)
                    })
                    .collect();
                let _ = writeln!(out, "{}", kept.join("; "));
            }
        }
    }

    for target in &plan.extractions {
        let _ = writeln!(
            out,
            "Extract:     #{} -> {}",
            target.stream_order,
            target.destination.display()
        );
    }
    if !plan.removed.is_empty() {
        let removed: Vec<String> = plan.removed.iter().map(|o| format!("#{}", o)).collect();
        let _ = writeln!(out, "Removed:     {}", removed.join(", "));
    }
    let _ = writeln!(out, "Track order: {}", plan.track_order_string());

    if let Some(args) = plan.to_extract_args() {
        let _ = writeln!(out, "Command:     {}", command_line("mkvextract", &args));
    }
    let _ = writeln!(out, "Command:     {}", command_line("mkvmerge", plan.to_merge_args()));
    out
}

fn render_cleanup(plan: &CleanupPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File:        {}", plan.source.display());
    let _ = writeln!(out, "Action:      cleanup");

    if plan.is_empty() {
        let _ = writeln!(out, "Edits:       none, the file is only marked as processed");
        return out;
    }

    for edit in &plan.track_edits {
        let line = match edit {
            TrackEdit::DeleteName { track_id } => format!("track:{} delete name", track_id),
            TrackEdit::SetName { track_id, name } => format!("track:{} name = \"{}\"", track_id, name),
            TrackEdit::SetLanguage { track_id, language } => {
                format!("track:{} language = {}", track_id, language)
            }
        };
        let _ = writeln!(out, "Edit:        {}", line);
    }
    if let Some(title) = &plan.title {
        let _ = writeln!(out, "Edit:        title = \"{}\"", title);
    }
    for attachment in &plan.attachment_deletions {
        let _ = writeln!(out, "Edit:        delete attachment {}", attachment);
    }
    if plan.delete_chapters {
        let _ = writeln!(out, "Edit:        delete chapters");
    }
    if plan.delete_statistics_tags {
        let _ = writeln!(out, "Edit:        delete track statistics tags");
    }
    let _ = writeln!(out, "Command:     {}", command_line("mkvpropedit", plan.to_propedit_args()));
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::model::{GeneralInfo, MediaFile, Track, TrackKind};

    struct FixedProbe(MediaFile);

    impl ProbePort for FixedProbe {
        fn probe(&self, _path: &Path) -> Result<MediaFile, DomainError> {
            Ok(self.0.clone())
        }
    }

    fn interactor() -> PlanInteractor {
        let tracks = vec![
            Track::new(TrackKind::Video, 0, 1),
            Track::new(TrackKind::Audio, 1, 2).with_language("en").with_format("AAC"),
            Track::new(TrackKind::Audio, 2, 3).with_language("fr").with_format("AAC"),
        ];
        let file = MediaFile::new("/m/Film [x].mkv", GeneralInfo::default(), tracks, 0).unwrap();
        PlanInteractor::new(Arc::new(FixedProbe(file)))
    }

    fn request(format: PlanFormat) -> PlanRequest {
        PlanRequest {
            path: PathBuf::from("/m/Film [x].mkv"),
            policy: Policy::new(["en"], ["en"], false, false).unwrap(),
            plan_options: PlanOptions::default(),
            format,
        }
    }

    #[test]
    fn test_text_rendering() {
        let response = interactor().execute(&request(PlanFormat::Text)).unwrap();
        assert!(response.plan.is_remux());
        assert!(response.rendered.contains("Action:      remux"));
        assert!(response.rendered.contains("#1 en \"AAC\", default"));
        assert!(response.rendered.contains("Subtitles:   drop all"));
        assert!(response.rendered.contains("Removed:     #2"));
        assert!(response.rendered.contains("--track-order 0:0,0:1"));
    }

    #[test]
    fn test_json_rendering() {
        let response = interactor().execute(&request(PlanFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&response.rendered).unwrap();
        assert_eq!(value["kind"], "remux");
        assert_eq!(value["title"], "Film");
        assert_eq!(value["subtitles"]["mode"], "drop_all");
        assert_eq!(value["track_order"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_yaml_rendering() {
        let response = interactor().execute(&request(PlanFormat::Yaml)).unwrap();
        assert!(response.rendered.contains("kind: remux"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(PlanFormat::parse("YAML").unwrap(), PlanFormat::Yaml);
        assert!(PlanFormat::parse("xml").is_err());
    }
}
