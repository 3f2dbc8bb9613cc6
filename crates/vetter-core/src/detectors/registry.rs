//! Detectors driven by registry metadata.

use super::{DetectionContext, Detector};
use crate::types::{Issue, IssueKind, IssueLevel};

/// Flags dependencies whose metadata lookup failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataFailureDetector;

impl Detector for MetadataFailureDetector {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        if !ctx.info.fetch_failed {
            return Vec::new();
        }
        vec![Issue::new(
            IssueLevel::Info,
            IssueKind::Meta,
            "could not fetch metadata",
        )]
    }
}

/// Flags deprecated versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeprecatedDetector;

impl Detector for DeprecatedDetector {
    fn name(&self) -> &'static str {
        "deprecated"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        if !ctx.info.deprecated {
            return Vec::new();
        }
        vec![Issue::new(
            IssueLevel::Warning,
            IssueKind::Deprecated,
            format!("Version {} is deprecated", ctx.dependency.version),
        )]
    }
}

/// Flags packages that run code at install time.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallScriptsDetector;

impl Detector for InstallScriptsDetector {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        if !ctx.info.has_install_scripts() {
            return Vec::new();
        }
        let hooks: Vec<&str> = ctx.info.install_hooks.iter().map(|h| h.as_str()).collect();
        vec![Issue::new(
            IssueLevel::Warning,
            IssueKind::Scripts,
            format!("Runs install scripts: {}", hooks.join(", ")),
        )]
    }
}
