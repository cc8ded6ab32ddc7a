// src/pipeline.rs

use crate::aggregator::DependencyMap;
use crate::changes;
use crate::compdb;
use crate::deps;
use crate::error::Result;
use crate::model::RankEntry;
use crate::ninja::Ninja;
use crate::ranking;
use crate::runner::CommandRunner;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct DepsOptions {
    pub ninja_binary: String,
    /// Absolute path of the ninja build directory
    pub build_dir: PathBuf,
    pub targets: Vec<String>,
    pub compile_commands: Option<PathBuf>,
    pub jobs: usize,
    pub progress: bool,
}

/// Cross-check fan-out against the change history of a repository.
#[derive(Debug, Clone)]
pub struct Weighting {
    /// Any directory inside the repository
    pub repo: PathBuf,
    pub num_commits: usize,
}

/// What a dependency gathering run produced.
#[derive(Debug)]
pub struct GatherReport {
    pub mapping: DependencyMap,
    pub total_commands: usize,
    pub selected_commands: usize,
    pub failed: usize,
}

/// Extracts build dependencies of `opts.targets` and maps every header to
/// the compile targets that include it.
///
/// Commands whose compiler invocation or output cannot be processed are
/// logged and left out; everything else still lands in the mapping.
pub fn gather_deps(opts: &DepsOptions, runner: &dyn CommandRunner) -> Result<GatherReport> {
    let db_path = opts
        .compile_commands
        .clone()
        .unwrap_or_else(|| opts.build_dir.join(compdb::FILE_NAME));
    let compile_commands = compdb::load(&db_path)?;
    info!("Found {} compile commands", compile_commands.len());
    for cmd in &compile_commands {
        debug!("{}", cmd.file.display());
    }

    let ninja = Ninja::new(opts.ninja_binary.clone(), runner);
    let inputs = ninja.target_inputs(&opts.build_dir, &opts.targets)?;

    let selected = compdb::filter(&compile_commands, &inputs);
    info!(
        "{} of the {} compile commands are required to build the requested targets.",
        selected.len(),
        compile_commands.len()
    );
    for cmd in &selected {
        debug!("{}", cmd.file.display());
    }

    let mapping = DependencyMap::new();
    let failed = AtomicUsize::new(0);

    let bar = if opts.progress {
        ProgressBar::new(selected.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Extracting dependencies");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs)
        .build()?;
    pool.install(|| {
        selected
            .par_iter()
            .progress_with(bar.clone())
            .for_each(|cmd| match deps::extract(runner, cmd) {
                Ok(target) => mapping.process(target),
                Err(e) => {
                    error!("{}", e);
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            });
    });
    bar.finish_and_clear();

    let failed = failed.into_inner();
    if failed > 0 {
        info!(
            "{} of {} compile commands were skipped, see errors above",
            failed,
            selected.len()
        );
    }

    Ok(GatherReport {
        mapping,
        total_commands: compile_commands.len(),
        selected_commands: selected.len(),
        failed,
    })
}

/// Gathers dependencies and ranks the top `n` headers, weighted by change
/// counts when `weighting` is given.
///
/// The history walk runs first, so an unusable repository aborts the run
/// before any compiler is invoked.
pub fn loudest_headers(
    opts: &DepsOptions,
    weighting: Option<&Weighting>,
    runner: &dyn CommandRunner,
    n: usize,
) -> Result<(GatherReport, Vec<RankEntry>)> {
    let statistics = weighting
        .map(|w| changes::gather_changes(&w.repo, Some(w.num_commits), opts.progress))
        .transpose()?;
    let report = gather_deps(opts, runner)?;
    let ranked = ranking::rank(&report.mapping, statistics.as_ref(), n);
    Ok((report, ranked))
}
