// Strip interactor - Orchestrates the per-file probe, plan, execute and
// finalize pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::errors::*;
use crate::domain::policy::Policy;
use crate::planner::{EditPlan, PlanBuilder, PlanOptions};
use crate::ports::*;

/// Request for a strip run
#[derive(Debug, Clone)]
pub struct StripRequest {
    /// Files or directories to process
    pub paths: Vec<PathBuf>,
    pub policy: Policy,
    pub discovery: DiscoveryOptions,
    pub plan_options: PlanOptions,
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Remuxed and replaced by the file at `output`
    Remuxed { output: PathBuf },
    /// Edited in place (possibly without any edit) and renamed to `output`
    Cleaned { output: PathBuf },
    /// Planned and reported only
    DryRun { remux: bool },
    /// Left untouched because processing failed
    Failed { error: DomainError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Response from a strip run
#[derive(Debug, Clone, Default)]
pub struct StripResponse {
    pub reports: Vec<FileReport>,
}

impl StripResponse {
    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.len() - self.failed()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }
}

/// Interactor for the strip use case
pub struct StripInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    fs_port: Arc<dyn FsPort>,
}

impl StripInteractor {
    /// Create new strip interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        fs_port: Arc<dyn FsPort>,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            fs_port,
        }
    }

    /// Process every discovered file. Failures are recorded per file and
    /// never stop the run.
    pub fn execute(&self, request: &StripRequest) -> StripResponse {
        let mut response = StripResponse::default();

        if let Some(tmp_dir) = &request.plan_options.tmp_dir {
            if !self.execute_port.is_dry_run() {
                if let Err(e) = self.fs_port.prepare_tmp_dir(tmp_dir) {
                    error!("{}", e);
                    response.reports.push(FileReport {
                        path: tmp_dir.clone(),
                        outcome: FileOutcome::Failed { error: e },
                    });
                    return response;
                }
            }
        }

        let builder = PlanBuilder::new(request.plan_options.clone());

        for input in &request.paths {
            let files = match self.fs_port.discover(input, &request.discovery) {
                Ok(files) => files,
                Err(e) => {
                    error!("{}", e);
                    response.reports.push(FileReport {
                        path: input.clone(),
                        outcome: FileOutcome::Failed { error: e },
                    });
                    continue;
                }
            };

            info!("{} file(s) to process under {}", files.len(), input.display());

            for file in files {
                info!("Processing {}", file.display());
                let outcome = match self.process_file(&file, &request.policy, &builder) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Failed to process {}: {}", file.display(), e);
                        FileOutcome::Failed { error: e }
                    }
                };
                response.reports.push(FileReport {
                    path: file,
                    outcome,
                });
            }
        }

        info!(
            "Processed {} file(s): {} succeeded, {} failed",
            response.total(),
            response.succeeded(),
            response.failed()
        );
        response
    }

    fn process_file(
        &self,
        path: &Path,
        policy: &Policy,
        builder: &PlanBuilder,
    ) -> Result<FileOutcome, DomainError> {
        let file = self.probe_port.probe(path)?;
        let plan = builder.build(&file, policy)?;

        if let Err(e) = self.execute_port.run(&plan) {
            if let EditPlan::Remux(remux) = &plan {
                if let Err(cleanup_error) = self.fs_port.discard_temp(&remux.output) {
                    warn!("{}", cleanup_error);
                }
            }
            return Err(e);
        }

        if self.execute_port.is_dry_run() {
            return Ok(FileOutcome::DryRun {
                remux: plan.is_remux(),
            });
        }

        match &plan {
            EditPlan::Remux(remux) => {
                let output = self
                    .fs_port
                    .replace_original(&remux.output, &remux.source)?;
                Ok(FileOutcome::Remuxed { output })
            }
            EditPlan::Cleanup(cleanup) => {
                if cleanup.is_empty() {
                    info!("Nothing to do for {}, marking as processed", path.display());
                }
                let output = self.fs_port.mark_processed(&cleanup.source)?;
                Ok(FileOutcome::Cleaned { output })
            }
        }
    }
}
