// src/aggregator.rs

use crate::model::CompileTarget;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Every header together with the targets that listed it.
pub type DependencyEntry = (String, Vec<Arc<CompileTarget>>);

/// For each dependency, the compile targets it is part of.
///
/// Safe to share between extraction workers. Entries keep the order in which
/// headers were first seen, which is what breaks ties when sorting.
#[derive(Debug, Default)]
pub struct DependencyMap {
    inner: Mutex<Index>,
}

#[derive(Debug, Default)]
struct Index {
    positions: HashMap<String, usize>,
    entries: Vec<DependencyEntry>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `target` to the entry of every one of its dependencies.
    pub fn process(&self, target: CompileTarget) {
        let target = Arc::new(target);
        let mut index = self.lock();
        let Index { positions, entries } = &mut *index;
        for dep in &target.dependencies {
            let slot = *positions.entry(dep.clone()).or_insert_with(|| {
                entries.push((dep.clone(), Vec::new()));
                entries.len() - 1
            });
            entries[slot].1.push(Arc::clone(&target));
        }
    }

    /// Entries ordered by descending number of targets, ties in first-seen order.
    pub fn sorted_items(&self) -> Vec<DependencyEntry> {
        let mut items = self.lock().entries.clone();
        items.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        items
    }

    /// Entries in first-seen order.
    pub fn items(&self) -> Vec<DependencyEntry> {
        self.lock().entries.clone()
    }

    #[cfg(test)]
    pub fn fan_out(&self, dependency: &str) -> usize {
        let index = self.lock();
        index
            .positions
            .get(dependency)
            .map_or(0, |&slot| index.entries[slot].1.len())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panicking worker cannot leave an entry half-appended, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Index> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn target(name: &str, deps: &[&str]) -> CompileTarget {
        CompileTarget {
            file: PathBuf::from(format!("/src/{name}.cc")),
            directory: PathBuf::from("/src/build"),
            target: format!("{name}.o"),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn fan_outs(map: &DependencyMap) -> BTreeMap<String, usize> {
        map.items().into_iter().map(|(k, v)| (k, v.len())).collect()
    }

    fn corpus() -> Vec<CompileTarget> {
        (0..200)
            .map(|i| {
                let mut deps = vec![format!("t{i}.cc"), "common.h".to_string()];
                if i % 3 == 0 {
                    deps.push("three.h".to_string());
                }
                if i % 7 == 0 {
                    deps.push("seven.h".to_string());
                }
                target(&format!("t{i}"), &deps.iter().map(String::as_str).collect::<Vec<_>>())
            })
            .collect()
    }

    #[test]
    fn sorts_by_fan_out_with_first_seen_ties() {
        let map = DependencyMap::new();
        map.process(target("a", &["b.h", "a.h"]));
        map.process(target("b", &["a.h", "c.h"]));
        map.process(target("c", &["d.h"]));

        let order: Vec<_> = map
            .sorted_items()
            .into_iter()
            .map(|(k, v)| (k, v.len()))
            .collect();
        assert_eq!(
            order,
            [
                ("a.h".to_string(), 2),
                ("b.h".to_string(), 1),
                ("c.h".to_string(), 1),
                ("d.h".to_string(), 1),
            ]
        );
        assert_eq!(map.fan_out("a.h"), 2);
        assert_eq!(map.fan_out("missing.h"), 0);
    }

    #[test]
    fn duplicate_listing_is_counted_twice() {
        let map = DependencyMap::new();
        map.process(target("a", &["a.h", "a.h"]));
        assert_eq!(map.fan_out("a.h"), 2);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let sequential = DependencyMap::new();
        corpus().into_iter().for_each(|t| sequential.process(t));

        let reversed = DependencyMap::new();
        corpus().into_iter().rev().for_each(|t| reversed.process(t));

        let parallel = DependencyMap::new();
        corpus().into_par_iter().for_each(|t| parallel.process(t));

        assert_eq!(fan_outs(&sequential), fan_outs(&reversed));
        assert_eq!(fan_outs(&sequential), fan_outs(&parallel));
        assert_eq!(parallel.fan_out("common.h"), 200);
        assert_eq!(parallel.fan_out("three.h"), 67);
        assert_eq!(parallel.fan_out("seven.h"), 29);
        assert_eq!(parallel.len(), 203);
    }
}
