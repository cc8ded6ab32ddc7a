// src/changes.rs

use crate::error::{Error, Result};
use crate::model::ChangeMap;
use chrono::TimeZone;
use git2::{Commit, DiffOptions, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, warn};

/// Walks HEAD along the first-parent line and counts how many commits
/// touched each file. Stops after `max_commits` diffs or at the root commit.
pub fn gather_changes(dir: &Path, max_commits: Option<usize>, progress: bool) -> Result<ChangeMap> {
    let repo = Repository::discover(dir).map_err(|e| repository_error(dir, e.message()))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| repository_error(dir, "repository has no working tree"))?
        .to_path_buf();
    let head = repo
        .head()
        .map_err(|e| repository_error(dir, e.message()))?;
    let branch = head.shorthand().unwrap_or("HEAD").to_string();
    let mut commit = head
        .peel_to_commit()
        .map_err(|_| repository_error(dir, "HEAD does not point to a commit"))?;

    match max_commits {
        Some(n) => info!("Gathering changes from {} latest commits on {}", n, branch),
        None => info!("Gathering changes on {}", branch),
    }

    let bar = match (progress, max_commits) {
        (false, _) => ProgressBar::hidden(),
        (true, Some(n)) => ProgressBar::new(n as u64),
        (true, None) => ProgressBar::new_spinner(),
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Walking history");

    let mut statistics = ChangeMap::default();
    let mut diff_opts = DiffOptions::new();
    diff_opts.ignore_filemode(true);

    while max_commits.map_or(true, |n| statistics.commits_walked < n) {
        debug!("Processing {} {}", short_id(&commit), summary(&commit));
        if commit.parent_count() == 0 {
            warn!("Commit {} doesn't have any parents.", short_id(&commit));
            statistics.reached_root = true;
            break;
        }

        let parent = commit.parent(0)?;
        let diff = repo.diff_tree_to_tree(
            Some(&parent.tree()?),
            Some(&commit.tree()?),
            Some(&mut diff_opts),
        )?;
        for delta in diff.deltas() {
            let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                continue;
            };
            debug!("- {} was touched", path.display());
            statistics.process(workdir.join(path));
        }

        statistics.commits_walked += 1;
        bar.inc(1);
        commit = parent;
    }
    bar.finish_and_clear();

    info!(
        "Walked {} commits back to {}, {} files changed",
        statistics.commits_walked,
        commit_date(&commit),
        statistics.len()
    );
    Ok(statistics)
}

fn repository_error(dir: &Path, reason: &str) -> Error {
    Error::Repository {
        path: dir.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn short_id(commit: &Commit) -> String {
    commit.id().to_string().chars().take(7).collect()
}

fn summary(commit: &Commit) -> String {
    commit.summary().unwrap_or("").to_string()
}

fn commit_date(commit: &Commit) -> String {
    chrono::Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .map_or_else(|| "an unknown date".to_string(), |dt| dt.to_rfc2822())
}
