//! Configuration hierarchy: CLI > environment > settings file > defaults
//!
//! clap already folds `MKVSTRIP_*` variables into the parsed arguments, so
//! only the arguments and the settings file need merging here.

use tracing::{debug, info};

use crate::adapters::toml_config::{PolicySettings, RunSettings, Settings, ToolSettings};
use crate::cli::{PolicyArgs, ToolArgs};
use crate::domain::errors::DomainError;
use crate::domain::policy::Policy;
use crate::planner::PlanOptions;
use crate::ports::DiscoveryOptions;

/// Effective options of one invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub tools: ToolSettings,
    pub policy: Policy,
    pub plan_options: PlanOptions,
    pub discovery: DiscoveryOptions,
    pub dry_run: bool,
}

/// Per-command values that only exist for `strip`
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    pub min_age_hours: Option<u64>,
    pub dry_run: bool,
}

/// Merge arguments over the settings file
pub fn resolve(
    settings: &Settings,
    tools: &ToolArgs,
    policy: &PolicyArgs,
    overrides: RunOverrides,
) -> Result<RunConfig, DomainError> {
    let config = RunConfig {
        tools: resolve_tools(tools, &settings.tools),
        policy: resolve_policy(policy, &settings.policy)?,
        plan_options: resolve_plan_options(policy, &settings.run),
        discovery: DiscoveryOptions {
            min_age_hours: overrides.min_age_hours.unwrap_or(settings.run.min_age_hours),
        },
        dry_run: overrides.dry_run || settings.run.dry_run,
    };

    info!(
        "Keeping audio [{}], subtitles [{}]{}{}",
        config.policy.audio_languages.join(", "),
        config.policy.subtitle_languages.join(", "),
        if config.policy.forced_subtitles_only { ", forced only" } else { "" },
        if config.policy.external_subtitles { ", extracted" } else { "" }
    );
    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

fn resolve_tools(args: &ToolArgs, file: &ToolSettings) -> ToolSettings {
    let pick = |arg: &Option<String>, configured: &String| arg.clone().unwrap_or_else(|| configured.clone());
    ToolSettings {
        mediainfo: pick(&args.mediainfo, &file.mediainfo),
        mkvmerge: pick(&args.mkvmerge, &file.mkvmerge),
        mkvextract: pick(&args.mkvextract, &file.mkvextract),
        mkvpropedit: pick(&args.mkvpropedit, &file.mkvpropedit),
    }
}

fn resolve_policy(args: &PolicyArgs, file: &PolicySettings) -> Result<Policy, DomainError> {
    let audio = if args.languages.is_empty() {
        &file.audio_languages
    } else {
        &args.languages
    };
    let subtitles = if args.sub_languages.is_empty() {
        &file.subtitle_languages
    } else {
        &args.sub_languages
    };

    Policy::new(
        audio,
        subtitles,
        args.sub_forced || file.forced_only,
        args.external_subtitles || file.external_subtitles,
    )
}

fn resolve_plan_options(args: &PolicyArgs, run: &RunSettings) -> PlanOptions {
    PlanOptions {
        tmp_dir: args.tmp_dir.clone().or_else(|| run.tmp_dir.clone()),
    }
}
