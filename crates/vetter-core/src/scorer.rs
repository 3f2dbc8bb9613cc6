//! Report aggregation: issue counts, letter grade and license histogram.

use crate::dedupe::CappedInput;
use crate::types::{DependencyResult, IssueLevel, LicenseCount, Report, Score};
use vetter_info::UNKNOWN_LICENSE;

/// Licenses listed in [`Report::top_licenses`].
pub const TOP_LICENSES: usize = 10;

/// Issue totals per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    /// Issues at [`IssueLevel::Critical`].
    pub critical: usize,
    /// Issues at [`IssueLevel::Warning`].
    pub warning: usize,
    /// Issues at [`IssueLevel::Info`].
    pub info: usize,
}

impl IssueCounts {
    /// Tally every issue across `results`.
    pub fn tally(results: &[DependencyResult]) -> Self {
        results
            .iter()
            .flat_map(|r| r.issues.iter())
            .fold(Self::default(), |mut counts, issue| {
                match issue.level {
                    IssueLevel::Critical => counts.critical += 1,
                    IssueLevel::Warning => counts.warning += 1,
                    IssueLevel::Info => counts.info += 1,
                }
                counts
            })
    }

    /// `C` with any critical issue, `B` with any warning, `A` otherwise.
    ///
    /// ```
    /// use vetter_core::{IssueCounts, Score};
    ///
    /// let counts = IssueCounts { critical: 0, warning: 2, info: 5 };
    /// assert_eq!(counts.score(), Score::B);
    /// ```
    pub fn score(&self) -> Score {
        if self.critical > 0 {
            Score::C
        } else if self.warning > 0 {
            Score::B
        } else {
            Score::A
        }
    }
}

/// Most common licenses, `UNKNOWN` excluded, ties in first-seen order.
pub fn top_licenses(results: &[DependencyResult], limit: usize) -> Vec<LicenseCount> {
    let mut histogram: Vec<LicenseCount> = Vec::new();

    for result in results {
        if result.license.is_empty() || result.license == UNKNOWN_LICENSE {
            continue;
        }
        match histogram.iter_mut().find(|e| e.license == result.license) {
            Some(entry) => entry.count += 1,
            None => histogram.push(LicenseCount {
                license: result.license.clone(),
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order among equal counts
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram.truncate(limit);
    histogram
}

/// Assemble the final report.
pub fn build_report(
    input: &CappedInput,
    project_license: Option<String>,
    results: Vec<DependencyResult>,
) -> Report {
    let counts = IssueCounts::tally(&results);

    Report {
        score: counts.score(),
        analyzed_count: results.len(),
        total_input_count: input.distinct_count,
        is_limited: input.is_limited,
        critical_count: counts.critical,
        warning_count: counts.warning,
        info_count: counts.info,
        project_license,
        top_licenses: top_licenses(&results, TOP_LICENSES),
        results,
    }
}
