// src/deps.rs

use crate::error::ExtractError;
use crate::model::{CompileCommand, CompileTarget};
use crate::runner::CommandRunner;
use tracing::debug;

/// Makes GCC/Clang print a make rule to stdout instead of compiling.
const DEPS_FLAGS: [&str; 3] = ["-MM", "-MF", "-"];

/// The stored command line, shell-split, with the dependency flags appended.
///
/// Falls back to whitespace splitting when the quoting is unbalanced, so a
/// malformed entry still reaches the compiler and fails there.
pub fn deps_command(command: &str) -> Vec<String> {
    let mut argv = shlex::split(command)
        .unwrap_or_else(|| command.split_whitespace().map(str::to_string).collect());
    argv.extend(DEPS_FLAGS.iter().map(|flag| flag.to_string()));
    argv
}

/// Splits `target: dep dep \` text into the target and its dependencies.
/// Returns `None` when there is no `:` at all.
pub fn parse_make_rule(text: &str) -> Option<(String, Vec<String>)> {
    let (target, deps) = text.split_once(':')?;
    let dependencies = deps
        .replace('\\', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    Some((target.trim().to_string(), dependencies))
}

pub fn extract(runner: &dyn CommandRunner, cmd: &CompileCommand) -> Result<CompileTarget, ExtractError> {
    let argv = deps_command(&cmd.command);
    let raw = runner
        .run(&argv, Some(cmd.directory.as_path()))
        .map_err(|source| ExtractError::DependencyFetch {
            file: cmd.file.clone(),
            source,
        })?;

    let (target, dependencies) = parse_make_rule(&raw).ok_or_else(|| ExtractError::DependencyParse {
        file: cmd.file.clone(),
    })?;
    debug!("{} depends on {} files", cmd.file.display(), dependencies.len());

    Ok(CompileTarget {
        file: cmd.file.clone(),
        directory: cmd.directory.clone(),
        target,
        dependencies,
    })
}
