// src/model.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One entry of `compile_commands.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileCommand {
    pub file: PathBuf,
    pub directory: PathBuf,
    pub command: String,
}

/// A translation unit whose header closure was reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTarget {
    /// Source file from the compile database
    pub file: PathBuf,
    /// Working directory the compiler ran in
    pub directory: PathBuf,
    /// Left-hand side of the make rule; not checked against `file`
    pub target: String,
    /// Dependencies in the order the compiler emitted them
    pub dependencies: Vec<String>,
}

/// Number of first-parent commits that touched each file
#[derive(Debug, Default)]
pub struct ChangeMap {
    counts: HashMap<PathBuf, usize>,
    pub commits_walked: usize,
    pub reached_root: bool,
}

impl ChangeMap {
    pub fn process(&mut self, path: PathBuf) {
        *self.counts.entry(path).or_insert(0) += 1;
    }

    pub fn get(&self, path: &Path) -> Option<usize> {
        self.counts.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Most frequently changed first, ties broken by path.
    pub fn sorted_items(&self) -> Vec<(&Path, usize)> {
        let mut items: Vec<_> = self.counts.iter().map(|(p, &c)| (p.as_path(), c)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        items
    }
}

impl FromIterator<(PathBuf, usize)> for ChangeMap {
    fn from_iter<I: IntoIterator<Item = (PathBuf, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// A ranked path and its score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub path: String,
    pub score: usize,
}

impl RankEntry {
    pub fn new(path: impl Into<String>, score: usize) -> Self {
        Self {
            path: path.into(),
            score,
        }
    }
}
