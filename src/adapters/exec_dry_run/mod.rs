//! Dry-run executor: logs the commands a plan would run

use tracing::info;

use crate::adapters::exec_mkvtoolnix::MkvToolNixExecutor;
use crate::domain::errors::*;
use crate::planner::EditPlan;
use crate::ports::*;

pub struct DryRunExecutor {
    inner: MkvToolNixExecutor,
}

impl DryRunExecutor {
    /// Wrap an executor whose command lines are reported instead of run
    pub fn new(inner: MkvToolNixExecutor) -> Self {
        Self { inner }
    }
}

impl ExecutePort for DryRunExecutor {
    fn run(&self, plan: &EditPlan) -> Result<(), DomainError> {
        let commands = self.inner.commands(plan);
        if commands.is_empty() {
            info!("[dry run] nothing to edit in {}", plan.source().display());
        }
        for command in commands {
            info!("[dry run] {}", command.command_line());
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
