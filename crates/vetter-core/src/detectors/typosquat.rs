//! Typosquat detection by edit distance to popular package names.

use super::{DetectionContext, Detector};
use crate::types::{Issue, IssueKind, IssueLevel};
use regex::Regex;
use std::sync::LazyLock;

/// High-profile package names that attract typosquats.
pub const POPULAR_PACKAGES: [&str; 17] = [
    "react",
    "lodash",
    "express",
    "axios",
    "moment",
    "chalk",
    "commander",
    "request",
    "webpack",
    "typescript",
    "vue",
    "angular",
    "jquery",
    "underscore",
    "debug",
    "async",
    "dotenv",
];

/// Conventional suffixes of legitimate companion packages.
static CONVENTIONAL_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)-(js|ts|node|npm|cli|lib|utils?|core|api)$").ok());

/// Warns when a name is one edit away from a popular package.
///
/// Scoped names and names with a conventional suffix are never flagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TyposquatDetector;

impl Detector for TyposquatDetector {
    fn name(&self) -> &'static str {
        "typosquat"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        let name = ctx.dependency.name.as_str();
        if name.starts_with('@') || has_conventional_suffix(name) {
            return Vec::new();
        }

        POPULAR_PACKAGES
            .iter()
            .find(|popular| **popular != name && levenshtein(name, popular) == 1)
            .map(|popular| {
                vec![Issue::new(
                    IssueLevel::Warning,
                    IssueKind::Typosquat,
                    format!("Name is one character away from popular package '{}'", popular),
                )]
            })
            .unwrap_or_default()
    }
}

fn has_conventional_suffix(name: &str) -> bool {
    CONVENTIONAL_SUFFIX
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// Levenshtein distance over chars, unit cost for insert, delete and substitute.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
