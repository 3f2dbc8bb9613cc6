//! Deduplication and capping of the input list.

use crate::types::Dependency;
use std::collections::HashSet;

/// Input after dedup and cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedInput {
    /// Distinct dependencies, first occurrence wins, at most `max` of them.
    pub dependencies: Vec<Dependency>,
    /// Distinct dependencies before the cap was applied.
    pub distinct_count: usize,
    /// Whether the cap dropped anything.
    pub is_limited: bool,
}

/// Collapse duplicate `name@version` pairs and keep the first `max`.
///
/// Order of first occurrence is preserved. Duplicates are dropped silently.
pub fn dedupe_and_cap(dependencies: Vec<Dependency>, max: usize) -> CappedInput {
    let mut seen = HashSet::with_capacity(dependencies.len());
    let mut unique: Vec<Dependency> = dependencies
        .into_iter()
        .filter(|dep| seen.insert(dep.key()))
        .collect();

    let distinct_count = unique.len();
    let is_limited = distinct_count > max;
    unique.truncate(max);

    CappedInput {
        dependencies: unique,
        distinct_count,
        is_limited,
    }
}

/// Distinct package names in first-seen order.
pub fn unique_names(dependencies: &[Dependency]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(dependencies.len());
    dependencies
        .iter()
        .filter(|dep| seen.insert(dep.name.as_str()))
        .map(|dep| dep.name.clone())
        .collect()
}
