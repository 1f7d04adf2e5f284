//! MKVToolNix execution adapter
//!
//! Applies edit plans with `mkvextract`, `mkvmerge` and `mkvpropedit`.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::domain::errors::*;
use crate::planner::{command_line, CleanupPlan, EditPlan, RemuxPlan};
use crate::ports::*;

/// Number of trailing stdout lines kept for error messages
const TAIL_LINES: usize = 5;

/// Resolved locations of the MKVToolNix binaries
#[derive(Debug, Clone, PartialEq)]
pub struct MkvToolNixPaths {
    pub mkvmerge: PathBuf,
    pub mkvextract: PathBuf,
    pub mkvpropedit: PathBuf,
}

/// A single external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    pub fn command_line(&self) -> String {
        command_line(&self.program.to_string_lossy(), &self.args)
    }

    /// Run to completion, handing every stdout line to `on_line`.
    ///
    /// A non-zero exit status fails with the tail of the output.
    pub fn run(&self, mut on_line: impl FnMut(&str)) -> Result<(), DomainError> {
        let tool = self.tool_name();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DomainError::tool(&tool, format!("failed to spawn: {}", e)))?;

        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buffer = String::new();
                let _ = stderr.read_to_string(&mut buffer);
                buffer
            })
        });

        let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line.map_err(|e| {
                    DomainError::tool(&tool, format!("failed to read output: {}", e))
                })?;
                on_line(&line);
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        let status = child
            .wait()
            .map_err(|e| DomainError::tool(&tool, format!("I/O error waiting for process: {}", e)))?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let mut details: Vec<String> = tail.into_iter().collect();
            if !stderr.trim().is_empty() {
                details.push(stderr.trim().to_string());
            }
            return Err(DomainError::tool(
                tool,
                format!("exited with status {}: {}", status, details.join(" | ")),
            ));
        }

        Ok(())
    }
}

/// Executor that runs the MKVToolNix binaries
pub struct MkvToolNixExecutor {
    paths: MkvToolNixPaths,
}

impl MkvToolNixExecutor {
    pub fn new(paths: MkvToolNixPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &MkvToolNixPaths {
        &self.paths
    }

    /// Commands for a plan in execution order
    pub fn commands(&self, plan: &EditPlan) -> Vec<ToolCommand> {
        match plan {
            EditPlan::Remux(remux) => self.remux_commands(remux),
            EditPlan::Cleanup(cleanup) => self.cleanup_commands(cleanup),
        }
    }

    fn remux_commands(&self, plan: &RemuxPlan) -> Vec<ToolCommand> {
        let mut commands = Vec::new();
        if let Some(args) = plan.to_extract_args() {
            let mut extract = ToolCommand::new(&self.paths.mkvextract);
            extract.args(args);
            commands.push(extract);
        }
        let mut merge = ToolCommand::new(&self.paths.mkvmerge);
        merge.args(plan.to_merge_args());
        commands.push(merge);
        commands
    }

    fn cleanup_commands(&self, plan: &CleanupPlan) -> Vec<ToolCommand> {
        if plan.is_empty() {
            return Vec::new();
        }
        let mut propedit = ToolCommand::new(&self.paths.mkvpropedit);
        propedit.args(plan.to_propedit_args());
        vec![propedit]
    }
}

impl ExecutePort for MkvToolNixExecutor {
    fn run(&self, plan: &EditPlan) -> Result<(), DomainError> {
        let commands = self.commands(plan);
        if commands.is_empty() {
            info!("Nothing to edit in {}", plan.source().display());
            return Ok(());
        }

        for command in commands {
            let tool = command.tool_name();
            debug!("Command: {}", command.command_line());
            command.run(|line| {
                if line.to_lowercase().contains("progress") {
                    info!(tool = %tool, "{}", line.trim());
                } else {
                    debug!(tool = %tool, "{}", line.trim());
                }
            })?;
            info!("{} finished for {}", tool, plan.source().display());
        }

        Ok(())
    }
}
