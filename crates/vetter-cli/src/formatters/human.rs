//! Human-readable formatter for analysis reports.

use colored::*;
use std::fmt::Write;
use vetter_core::{DependencyResult, Issue, IssueLevel, Report, Score};

pub struct HumanFormatter;

/// Render the report as colored terminal text.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "Vetter Dependency Report".bold());
    let _ = writeln!(out, "========================\n");

    let _ = writeln!(
        out,
        "Score: {}  ({} critical, {} warnings, {} info)",
        score_label(report.score),
        report.critical_count,
        report.warning_count,
        report.info_count
    );

    if report.is_limited {
        let _ = writeln!(
            out,
            "Analyzed: {} of {} distinct dependencies {}",
            report.analyzed_count,
            report.total_input_count,
            "(limit reached)".yellow()
        );
    } else {
        let _ = writeln!(out, "Analyzed: {} dependencies", report.analyzed_count);
    }

    if let Some(license) = &report.project_license {
        let _ = writeln!(out, "Project license: {}", license);
    }

    if !report.top_licenses.is_empty() {
        let _ = writeln!(out, "\n{}", "Licenses:".bold());
        for entry in &report.top_licenses {
            let _ = writeln!(out, "  {:<24} {}", entry.license, entry.count);
        }
    }

    let flagged: Vec<&DependencyResult> = report
        .results
        .iter()
        .filter(|r| !r.issues.is_empty())
        .collect();

    if flagged.is_empty() {
        let _ = writeln!(out, "\n{} No issues found", "✓".green());
        return out;
    }

    let _ = writeln!(out, "\n{}", "Issues:".bold());
    for result in flagged {
        let _ = writeln!(
            out,
            "\n  {}@{} {}",
            result.name.cyan(),
            result.version,
            format!("({})", result.license).bright_black()
        );
        for issue in &result.issues {
            write_issue(&mut out, issue);
        }
    }

    let fixes = report.fixes_joined();
    if !fixes.is_empty() {
        let _ = writeln!(out, "\n{}", "Suggested fixes:".bold());
        let _ = writeln!(out, "  npm install {}", fixes);
    }

    out
}

fn write_issue(out: &mut String, issue: &Issue) {
    let marker = match issue.level {
        IssueLevel::Critical => "✗".red(),
        IssueLevel::Warning => "⚠".yellow(),
        IssueLevel::Info => "•".blue(),
    };
    let _ = write!(
        out,
        "    {} {:<10} {}",
        marker,
        issue.kind.as_str(),
        issue.message
    );
    if let Some(fix) = &issue.fix {
        let _ = write!(out, " {}", format!("-> {}", fix).green());
    }
    out.push('\n');
}

fn score_label(score: Score) -> ColoredString {
    match score {
        Score::A => score.as_str().green().bold(),
        Score::B => score.as_str().yellow().bold(),
        Score::C => score.as_str().red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetter_core::{IssueKind, LicenseCount};

    fn report(results: Vec<DependencyResult>) -> Report {
        Report {
            score: Score::B,
            analyzed_count: results.len(),
            total_input_count: results.len(),
            is_limited: false,
            critical_count: 0,
            warning_count: 1,
            info_count: 0,
            project_license: Some("MIT".to_string()),
            top_licenses: vec![LicenseCount {
                license: "MIT".to_string(),
                count: results.len(),
            }],
            results,
        }
    }

    fn result(name: &str, issues: Vec<Issue>) -> DependencyResult {
        DependencyResult {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            requested_range: None,
            license: "MIT".to_string(),
            latest_version: None,
            issues,
        }
    }

    #[test]
    fn test_render_issues_and_fixes() {
        colored::control::set_override(false);

        let rendered = render(&report(vec![
            result("clean", Vec::new()),
            result(
                "left-pad",
                vec![Issue::new(IssueLevel::Warning, IssueKind::Update, "minor update available: 1.0.0 -> 1.3.0")
                    .with_fix("left-pad@1.3.0")],
            ),
        ]));

        assert!(rendered.contains("Score: B  (0 critical, 1 warnings, 0 info)"));
        assert!(rendered.contains("Project license: MIT"));
        assert!(rendered.contains("left-pad@1.0.0 (MIT)"));
        assert!(rendered.contains("⚠ update"));
        assert!(rendered.contains("-> left-pad@1.3.0"));
        assert!(rendered.contains("npm install left-pad@1.3.0"));
        assert!(!rendered.contains("clean@1.0.0"));
    }

    #[test]
    fn test_render_clean_and_limited() {
        colored::control::set_override(false);

        let mut clean = report(vec![result("clean", Vec::new())]);
        clean.is_limited = true;
        clean.total_input_count = 700;

        let rendered = render(&clean);
        assert!(rendered.contains("No issues found"));
        assert!(rendered.contains("Analyzed: 1 of 700 distinct dependencies (limit reached)"));
        assert!(!rendered.contains("Suggested fixes"));
    }
}
