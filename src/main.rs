// src/main.rs

mod aggregator;
mod changes;
mod cli;
mod compdb;
mod deps;
mod error;
mod model;
mod ninja;
mod paths;
mod pipeline;
mod ranking;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command, Format, GatherChangesArgs, GatherDepsArgs};
use model::RankEntry;
use pipeline::{DepsOptions, Weighting};
use runner::ProcessRunner;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    match args.command {
        Command::GatherDeps(args) => gather_deps(args)?,
        Command::GatherChanges(args) => gather_changes(args)?,
    }

    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn gather_deps(args: GatherDepsArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let ninja_binary = match &args.ninja_binary {
        Some(path) => paths::absolutize(&cwd, path).to_string_lossy().into_owned(),
        None => "ninja".to_string(),
    };
    let targets = if args.targets.is_empty() {
        warn!("No targets were specified, assuming `all`.");
        vec!["all".to_string()]
    } else {
        args.targets
    };
    let jobs = args
        .jobs
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()));
    let build_dir = paths::absolutize(&cwd, &args.build_dir);

    let opts = DepsOptions {
        ninja_binary,
        build_dir: build_dir.clone(),
        targets,
        compile_commands: args.compile_commands.map(|p| paths::absolutize(&cwd, &p)),
        jobs,
        progress: !args.output.no_progress,
    };
    let weighting = args.num_commits.map(|num_commits| Weighting {
        repo: args.repo.unwrap_or(build_dir),
        num_commits,
    });

    let (report, ranked) =
        pipeline::loudest_headers(&opts, weighting.as_ref(), &ProcessRunner, args.num_files)?;
    if report.mapping.is_empty() {
        warn!("No dependencies were gathered for {}", opts.targets.join(", "));
    }
    info!(
        "Mapped {} headers from {} of {} compile commands ({} failed)",
        report.mapping.len(),
        report.selected_commands - report.failed,
        report.total_commands,
        report.failed
    );

    if weighting.is_some() {
        print_ranking(&ranked, args.output.format, |e| {
            format!("{} contributed to {} recompilations", e.path, e.score)
        })
    } else {
        print_ranking(&ranked, args.output.format, |e| {
            format!("{} contributes to {} targets", e.path, e.score)
        })
    }
}

fn gather_changes(args: GatherChangesArgs) -> Result<()> {
    let statistics = changes::gather_changes(&args.dir, args.max_commits, !args.output.no_progress)?;
    let ranked = ranking::rank_changes(&statistics, args.num_files);
    print_ranking(&ranked, args.output.format, |e| {
        format!("{} was changed {} times", e.path, e.score)
    })
}

fn print_ranking(ranked: &[RankEntry], format: Format, line: impl Fn(&RankEntry) -> String) -> Result<()> {
    match format {
        Format::Text => ranked.iter().for_each(|entry| println!("{}", line(entry))),
        Format::Json => println!("{}", serde_json::to_string_pretty(ranked)?),
    }
    Ok(())
}
