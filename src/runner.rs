// src/runner.rs

use crate::error::RunError;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::trace;

/// Runs an external program and hands back its standard output.
///
/// Extraction workers call this concurrently, so implementations must be `Sync`.
pub trait CommandRunner: Sync {
    fn run(&self, argv: &[String], cwd: Option<&Path>) -> Result<String, RunError>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String], cwd: Option<&Path>) -> Result<String, RunError> {
        let (program, args) = argv.split_first().ok_or(RunError::EmptyCommand)?;

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        trace!("running {:?} in {:?}", argv, cwd);

        let output = command.output().map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(RunError::Failed {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
