// src/compdb.rs

use crate::error::{Error, Result};
use crate::model::CompileCommand;
use crate::paths;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "compile_commands.json";

pub fn load(path: &Path) -> Result<Vec<CompileCommand>> {
    let text = fs::read_to_string(path).map_err(|source| Error::CompileDatabaseRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::CompileDatabaseParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps the commands whose source file is one of `inputs`.
///
/// Relative `file` entries are resolved against the entry's `directory`
/// before the membership test.
pub fn filter<'a>(
    commands: &'a [CompileCommand],
    inputs: &HashSet<PathBuf>,
) -> Vec<&'a CompileCommand> {
    if inputs.is_empty() {
        return Vec::new();
    }
    commands
        .iter()
        .filter(|cmd| inputs.contains(&paths::absolutize(&cmd.directory, &cmd.file)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(file: &str) -> CompileCommand {
        CompileCommand {
            file: PathBuf::from(file),
            directory: PathBuf::from("/src/build"),
            command: format!("c++ -c {file}"),
        }
    }

    #[test]
    fn loads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(
            &path,
            r#"[{"file": "/src/a.cc", "directory": "/src/build", "command": "c++ -c /src/a.cc", "output": "a.o"}]"#,
        )
        .unwrap();

        let commands = load(&path).unwrap();
        assert_eq!(commands, vec![CompileCommand {
            file: PathBuf::from("/src/a.cc"),
            directory: PathBuf::from("/src/build"),
            command: "c++ -c /src/a.cc".to_string(),
        }]);
    }

    #[test]
    fn missing_and_malformed_databases_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        assert!(matches!(load(&path), Err(Error::CompileDatabaseRead { .. })));

        fs::write(&path, r#"[{"file": "/src/a.cc"}]"#).unwrap();
        assert!(matches!(load(&path), Err(Error::CompileDatabaseParse { .. })));
    }

    #[test]
    fn keeps_only_required_sources() {
        let commands = vec![cmd("/src/a.cc"), cmd("/src/b.cc"), cmd("../c.cc")];
        let inputs: HashSet<PathBuf> = ["/src/a.cc", "/src/c.cc"].iter().map(PathBuf::from).collect();

        let kept: Vec<_> = filter(&commands, &inputs).into_iter().map(|c| c.file.clone()).collect();
        assert_eq!(kept, vec![PathBuf::from("/src/a.cc"), PathBuf::from("../c.cc")]);
    }

    #[test]
    fn empty_input_set_selects_nothing() {
        let commands = vec![cmd("/src/a.cc")];
        assert!(filter(&commands, &HashSet::new()).is_empty());
    }
}
