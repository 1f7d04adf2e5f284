use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::adapters::toml_config::ToolSettings;
use crate::adapters::{DryRunExecutor, LocalFsAdapter, MediaInfoProbe, MkvToolNixExecutor, SavedProbe};
use crate::app::{plan_interactor::PlanInteractor, strip_interactor::StripInteractor};
use crate::domain::errors::DomainError;
use crate::ports::{ExecutePort, FsPort, ProbePort};

pub trait AppContainer {
    fn strip_interactor(&self) -> Result<Arc<StripInteractor>, DomainError>;
    fn plan_interactor(&self) -> Result<Arc<PlanInteractor>, DomainError>;
}

/// Wires the real adapters. Tools are resolved on first use so that
/// commands which do not need a tool never fail for its absence.
pub struct DefaultAppContainer {
    tools: ToolSettings,
    dry_run: bool,
    probe_document: Option<PathBuf>,
}

impl DefaultAppContainer {
    pub fn new(tools: ToolSettings, dry_run: bool) -> Self {
        Self {
            tools,
            dry_run,
            probe_document: None,
        }
    }

    /// Answer probes from a saved mediainfo JSON document instead of
    /// running mediainfo
    pub fn with_probe_document(mut self, document: Option<&Path>) -> Self {
        self.probe_document = document.map(Path::to_path_buf);
        self
    }

    fn probe_port(&self) -> Result<Arc<dyn ProbePort>, DomainError> {
        match &self.probe_document {
            Some(document) => {
                debug!("Probing from saved document {}", document.display());
                Ok(Arc::new(SavedProbe::new(document)))
            }
            None => Ok(Arc::new(MediaInfoProbe::new(self.tools.resolve_mediainfo()?))),
        }
    }

    fn execute_port(&self) -> Result<Arc<dyn ExecutePort>, DomainError> {
        let paths = match self.tools.resolve_mkvtoolnix() {
            Ok(paths) => paths,
            // A dry run only prints command lines
            Err(e) if self.dry_run => {
                debug!("{}; printing commands with configured names", e);
                self.tools.configured_mkvtoolnix()
            }
            Err(e) => return Err(e),
        };
        let executor = MkvToolNixExecutor::new(paths);
        debug!("Using MKVToolNix binaries {:?}", executor.paths());
        if self.dry_run {
            Ok(Arc::new(DryRunExecutor::new(executor)))
        } else {
            Ok(Arc::new(executor))
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn strip_interactor(&self) -> Result<Arc<StripInteractor>, DomainError> {
        let fs_port: Arc<dyn FsPort> = Arc::new(LocalFsAdapter::new());
        Ok(Arc::new(StripInteractor::new(
            self.probe_port()?,
            self.execute_port()?,
            fs_port,
        )))
    }

    fn plan_interactor(&self) -> Result<Arc<PlanInteractor>, DomainError> {
        Ok(Arc::new(PlanInteractor::new(self.probe_port()?)))
    }
}
