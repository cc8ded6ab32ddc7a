// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run before any parallel work starts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{binary} reports version {found:?}, but at least {required} is required")]
    ToolVersion {
        binary: String,
        found: String,
        required: &'static str,
    },

    #[error("failed to query build inputs of {targets}: {source}")]
    Resolver {
        targets: String,
        #[source]
        source: RunError,
    },

    #[error("cannot use repository at {}: {reason}", path.display())]
    Repository { path: PathBuf, reason: String },

    #[error("failed to read compile database {}: {source}", path.display())]
    CompileDatabaseRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed compile database {}: {source}", path.display())]
    CompileDatabaseParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("git error while walking history: {0}")]
    Git(#[from] git2::Error),
}

/// Errors for a single compile command. These are logged and skipped.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to fetch deps of {}: {source}", file.display())]
    DependencyFetch {
        file: PathBuf,
        #[source]
        source: RunError,
    },

    #[error("failed to parse deps of {}: no ':' in compiler output", file.display())]
    DependencyParse { file: PathBuf },
}

/// An external process that could not be run or exited unsuccessfully.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
