// src/ranking.rs

use crate::aggregator::DependencyMap;
use crate::model::{ChangeMap, RankEntry};
use crate::paths;
use std::path::Path;

/// Top `n` dependencies by fan-out, or by `changes × fan-out` when a change
/// map is given. Equal scores keep the dependency map's first-seen order.
pub fn rank(deps: &DependencyMap, changes: Option<&ChangeMap>, n: usize) -> Vec<RankEntry> {
    let mut ranked: Vec<RankEntry> = match changes {
        None => deps
            .sorted_items()
            .into_iter()
            .map(|(key, targets)| RankEntry::new(key, targets.len()))
            .collect(),
        Some(changes) => deps
            .items()
            .into_iter()
            .filter_map(|(key, targets)| {
                // Compilers may report paths relative to where they ran. A
                // relative key is taken to name one file, so the first
                // target's directory stands for all of them.
                let directory = targets.first().map_or(Path::new("/"), |t| t.directory.as_path());
                let count = changes.get(&paths::absolutize(directory, Path::new(&key)))?;
                Some(RankEntry::new(key, count * targets.len()))
            })
            .collect(),
    };
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(n);
    ranked
}

/// Top `n` files by change count.
pub fn rank_changes(changes: &ChangeMap, n: usize) -> Vec<RankEntry> {
    changes
        .sorted_items()
        .into_iter()
        .take(n)
        .map(|(path, count)| RankEntry::new(path.to_string_lossy(), count))
        .collect()
}
