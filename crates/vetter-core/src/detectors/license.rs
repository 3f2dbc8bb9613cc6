//! License conflict detection.

use super::{DetectionContext, Detector};
use crate::types::{Issue, IssueKind, IssueLevel};
use vetter_info::UNKNOWN_LICENSE;

const PERMISSIVE_MARKERS: [&str; 3] = ["MIT", "BSD", "APACHE"];

/// Compares a dependency's license against the project license.
///
/// Only permissive projects are checked. Either side missing or `UNKNOWN`
/// skips the check.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseDetector;

impl Detector for LicenseDetector {
    fn name(&self) -> &'static str {
        "license"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        let Some(project) = known_license(ctx.project_license) else {
            return Vec::new();
        };
        let Some(dependency) = known_license(Some(ctx.info.license.as_str())) else {
            return Vec::new();
        };

        license_conflict(&project, &dependency)
            .map(|(level, reason)| {
                vec![Issue::new(
                    level,
                    IssueKind::License,
                    format!("{} license {}", ctx.info.license, reason),
                )]
            })
            .unwrap_or_default()
    }
}

fn known_license(license: Option<&str>) -> Option<String> {
    let upper = license?.trim().to_uppercase();
    if upper.is_empty() || upper == UNKNOWN_LICENSE {
        None
    } else {
        Some(upper)
    }
}

/// Conflict between an uppercased project license and dependency license.
fn license_conflict(project: &str, dependency: &str) -> Option<(IssueLevel, &'static str)> {
    let permissive = PERMISSIVE_MARKERS.iter().any(|m| project.contains(m));

    if permissive && dependency.contains("AGPL") {
        return Some((IssueLevel::Warning, "requires network use to trigger copyleft"));
    }
    if permissive && dependency.contains("GPL") && !dependency.contains("LGPL") {
        return Some((IssueLevel::Warning, "requires derivatives to be open source"));
    }
    if project.contains("MIT") && dependency.contains("LGPL") {
        return Some((IssueLevel::Info, "compatible but may require attribution"));
    }
    None
}
