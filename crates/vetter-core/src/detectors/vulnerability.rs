//! Known-vulnerability issues from resolved advisories.

use super::{DetectionContext, Detector};
use crate::types::{Issue, IssueKind, IssueLevel};

/// One issue per advisory affecting the dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct VulnerabilityDetector;

impl Detector for VulnerabilityDetector {
    fn name(&self) -> &'static str {
        "vulnerability"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        ctx.advisories
            .iter()
            .map(|advisory| {
                let issue = Issue::new(
                    IssueLevel::from(advisory.severity),
                    IssueKind::Vuln,
                    format!("{}: {}", advisory.id, advisory.summary),
                );
                match advisory.fixed_version.as_deref() {
                    Some(fixed) if !fixed.is_empty() => {
                        issue.with_fix(format!("{}@{}", ctx.dependency.name, fixed))
                    }
                    _ => issue,
                }
            })
            .collect()
    }
}
