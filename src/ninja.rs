// src/ninja.rs

use crate::error::{Error, Result};
use crate::paths;
use crate::runner::CommandRunner;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `-t inputs` only lists transitive inputs since ninja 1.11.
pub const MIN_VERSION: (u64, u64, u64) = (1, 11, 0);
const MIN_VERSION_STR: &str = "1.11.0";

pub struct Ninja<'r> {
    binary: String,
    runner: &'r dyn CommandRunner,
}

impl<'r> Ninja<'r> {
    pub fn new(binary: impl Into<String>, runner: &'r dyn CommandRunner) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    pub fn verify_version(&self) -> Result<()> {
        let argv = [self.binary.clone(), "--version".to_string()];
        let output = self.runner.run(&argv, None).map_err(|source| Error::Resolver {
            targets: "--version".to_string(),
            source,
        })?;
        let found = output.trim().to_string();
        match parse_version(&found) {
            Some(version) if version >= MIN_VERSION => {
                debug!("{} is version {}", self.binary, found);
                Ok(())
            }
            _ => Err(Error::ToolVersion {
                binary: self.binary.clone(),
                found,
                required: MIN_VERSION_STR,
            }),
        }
    }

    /// Absolute paths of every file needed, transitively, to build `targets`.
    pub fn target_inputs(&self, build_dir: &Path, targets: &[String]) -> Result<HashSet<PathBuf>> {
        self.verify_version()?;
        debug!(
            "calling {} to fetch inputs for {} from {}",
            self.binary,
            targets.join(", "),
            build_dir.display()
        );

        let mut argv = vec![
            self.binary.clone(),
            "-C".to_string(),
            build_dir.to_string_lossy().into_owned(),
            "-t".to_string(),
            "inputs".to_string(),
        ];
        argv.extend(targets.iter().cloned());

        let output = self.runner.run(&argv, None).map_err(|source| Error::Resolver {
            targets: targets.join(", "),
            source,
        })?;

        let inputs: HashSet<PathBuf> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| paths::absolutize(build_dir, Path::new(line)))
            .collect();
        info!(
            "Found {} inputs required to build {}",
            inputs.len(),
            targets.join(", ")
        );
        Ok(inputs)
    }
}

/// Reads the leading `major.minor.patch` of a version string. Anything after
/// the numeric prefix of a component (`1.12.0.git`, `1.10.2-rc1`) is ignored
/// and missing components count as zero.
pub fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    let mut parts = text.trim().split('.').map(|part| {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u64>().ok()
    });
    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunError;
    use std::sync::Mutex;

    struct Scripted {
        version: &'static str,
        inputs: std::result::Result<&'static str, ()>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl Scripted {
        fn new(version: &'static str, inputs: std::result::Result<&'static str, ()>) -> Self {
            Self {
                version,
                inputs,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Scripted {
        fn run(&self, argv: &[String], _cwd: Option<&Path>) -> std::result::Result<String, RunError> {
            self.calls.lock().unwrap().push(argv.to_vec());
            if argv[1] == "--version" {
                return Ok(self.version.to_string());
            }
            self.inputs.map(str::to_string).map_err(|_| RunError::Failed {
                program: argv[0].clone(),
                status: "exit status: 1".to_string(),
                stderr: "ninja: error: unknown target 'nope'".to_string(),
            })
        }
    }

    #[test]
    fn parses_versions() {
        assert_eq!(parse_version("1.11.1\n"), Some((1, 11, 1)));
        assert_eq!(parse_version("1.12.0.git"), Some((1, 12, 0)));
        assert_eq!(parse_version("1.10"), Some((1, 10, 0)));
        assert_eq!(parse_version("garbage"), None);
        assert!(parse_version("1.10.2").unwrap() < MIN_VERSION);
    }

    #[test]
    fn relative_inputs_become_absolute() {
        let runner = Scripted::new("1.11.1\n", Ok("../src/a.cc\n/abs/b.cc\n\nbuild.ninja\n"));
        let ninja = Ninja::new("ninja", &runner);

        let inputs = ninja
            .target_inputs(Path::new("/proj/build"), &["all".to_string()])
            .unwrap();
        let expected: HashSet<PathBuf> = ["/proj/src/a.cc", "/abs/b.cc", "/proj/build/build.ninja"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(inputs, expected);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[1], ["ninja", "-C", "/proj/build", "-t", "inputs", "all"]);
    }

    #[test]
    fn old_ninja_is_rejected_before_querying_inputs() {
        let runner = Scripted::new("1.10.2", Ok("a.cc"));
        let ninja = Ninja::new("ninja", &runner);

        let err = ninja
            .target_inputs(Path::new("/proj/build"), &["all".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::ToolVersion { .. }));
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_query_is_a_resolver_error() {
        let runner = Scripted::new("1.12.0", Err(()));
        let ninja = Ninja::new("ninja", &runner);

        let err = ninja
            .target_inputs(Path::new("/proj/build"), &["nope".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Resolver { .. }));
    }
}
