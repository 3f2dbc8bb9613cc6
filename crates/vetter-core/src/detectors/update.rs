//! Safe update suggestions.

use super::{DetectionContext, Detector};
use crate::types::{Issue, IssueKind, IssueLevel};
use crate::version::{parse_version, range_satisfied, version_diff};
use tracing::debug;

/// Suggests `latest` when it is a patch or minor bump the manifest range allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateDetector;

impl Detector for UpdateDetector {
    fn name(&self) -> &'static str {
        "update"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        let dep = ctx.dependency;
        let Some(latest) = ctx.latest_version else {
            return Vec::new();
        };
        if latest == dep.version {
            return Vec::new();
        }

        let (Ok(current_v), Ok(latest_v)) = (parse_version(&dep.version), parse_version(latest))
        else {
            return Vec::new();
        };
        if latest_v <= current_v {
            return Vec::new();
        }

        let diff = match version_diff(&dep.version, latest) {
            Ok(Some(diff)) if diff.is_safe_update() => diff,
            _ => return Vec::new(),
        };

        if let Some(range) = dep.requested_range.as_deref() {
            let allowed = range_satisfied(range, latest).unwrap_or_else(|e| {
                debug!(package = %dep.name, range, error = %e, "range check failed, allowing update");
                true
            });
            if !allowed {
                return Vec::new();
            }
        }

        vec![Issue::new(
            IssueLevel::Info,
            IssueKind::Update,
            format!("{} update available: {} -> {}", diff, dep.version, latest),
        )
        .with_fix(format!("{}@{}", dep.name, latest))]
    }
}
