//! Command implementations

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::adapters::toml_config::Settings;
use crate::app::{AppContainer, DefaultAppContainer, FileOutcome, PlanFormat, PlanRequest, StripRequest};
use crate::cli::args::{PlanArgs, StripArgs, ToolArgs};
use crate::config_initialization::{resolve, RunOverrides};
use crate::error::StripError;

/// Execute the strip command
pub fn strip(settings: &Settings, tools: &ToolArgs, args: StripArgs) -> Result<()> {
    let config = resolve(
        settings,
        tools,
        &args.policy,
        RunOverrides {
            min_age_hours: args.min_age,
            dry_run: args.dry_run,
        },
    )
    .context("Invalid configuration")?;

    if config.dry_run {
        info!("Dry run: no file will be changed");
    }

    let container = DefaultAppContainer::new(config.tools.clone(), config.dry_run);
    let interactor = container
        .strip_interactor()
        .context("Failed to set up external tools")?;

    let response = interactor.execute(&StripRequest {
        paths: args.paths,
        policy: config.policy,
        discovery: config.discovery,
        plan_options: config.plan_options,
    });

    for report in &response.reports {
        match &report.outcome {
            FileOutcome::Remuxed { output } => info!("Remuxed: {}", output.display()),
            FileOutcome::Cleaned { output } => info!("Cleaned: {}", output.display()),
            FileOutcome::DryRun { remux } => info!(
                "Planned {}: {}",
                if *remux { "remux" } else { "cleanup" },
                report.path.display()
            ),
            FileOutcome::Failed { error } => error!("Failed: {}: {}", report.path.display(), error),
        }
    }

    if response.failed() > 0 {
        return Err(StripError::RunFailed {
            failed: response.failed(),
            total: response.total(),
        }
        .into());
    }

    Ok(())
}

/// Execute the plan command
pub fn plan(settings: &Settings, tools: &ToolArgs, args: PlanArgs) -> Result<()> {
    let config = resolve(settings, tools, &args.policy, RunOverrides::default())
        .context("Invalid configuration")?;
    let format = PlanFormat::parse(&args.format)?;

    let container = DefaultAppContainer::new(config.tools.clone(), true)
        .with_probe_document(args.probe_json.as_deref());
    let interactor = container
        .plan_interactor()
        .context("Failed to set up external tools")?;

    let response = interactor
        .execute(&PlanRequest {
            path: args.file.clone(),
            policy: config.policy,
            plan_options: config.plan_options,
            format,
        })
        .map_err(|e| match e {
            StripError::Domain(source) => StripError::file(&args.file, source),
            other => other,
        })?;

    print!("{}", response.rendered);
    if !response.rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
