// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Find the loudest headers of a C/C++ build
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extracts build dependencies between files.
    ///
    /// Processes `build.ninja` and `compile_commands.json`, asks the compiler
    /// for the dependency list of every required translation unit and maps
    /// each header to the compile targets it is part of.
    GatherDeps(GatherDepsArgs),

    /// Counts how many times each file has been changed in git.
    GatherChanges(GatherChangesArgs),
}

#[derive(clap::Args, Debug)]
pub struct GatherDepsArgs {
    /// ninja executable to query for target inputs
    #[arg(short = 'b', long, env = "HPP_RAY_NINJA")]
    pub ninja_binary: Option<PathBuf>,

    /// Top N loudest headers
    #[arg(short = 'n', long, default_value_t = 10)]
    pub num_files: usize,

    /// Cross-check with the last C commits
    #[arg(short = 'c', long)]
    pub num_commits: Option<usize>,

    /// Repository to cross-check against (defaults to the build directory)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Compile database (defaults to BUILD_DIR/compile_commands.json)
    #[arg(long)]
    pub compile_commands: Option<PathBuf>,

    /// Number of concurrent compiler invocations (defaults to the CPU count)
    #[arg(short = 'j', long, env = "HPP_RAY_JOBS")]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// ninja build directory
    pub build_dir: PathBuf,

    /// ninja targets to analyze (defaults to `all`)
    pub targets: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct GatherChangesArgs {
    /// Stop after this many first-parent commits
    #[arg(long)]
    pub max_commits: Option<usize>,

    /// Top N most changed files
    #[arg(short = 'n', long, default_value_t = 10)]
    pub num_files: usize,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Any directory inside the repository
    pub dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Format {
    /// One human-readable line per entry
    Text,
    /// A JSON array of {path, score} objects
    Json,
}
