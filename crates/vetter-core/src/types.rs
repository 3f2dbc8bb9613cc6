//! Core types for dependency risk analysis.

use serde::{Deserialize, Serialize};
use vetter_info::{InstallHook, Severity, VersionMetadata, UNKNOWN_LICENSE};

/// Maximum length (in characters) of an issue message.
pub const MAX_MESSAGE_LEN: usize = 200;

/// One resolved dependency, as produced by the manifest parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Package name (e.g. "react" or "@types/node").
    pub name: String,
    /// Concrete resolved version.
    pub version: String,
    /// Range expression from the manifest (e.g. "^1.2.3").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_range: Option<String>,
}

impl Dependency {
    /// Create a dependency without a requested range.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requested_range: None,
        }
    }

    /// Attach the manifest's requested range.
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.requested_range = Some(range.into());
        self
    }

    /// `name@version` key used for dedup and lookups.
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Input to one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Flat, already-resolved dependency list.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// License of the project being analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_license: Option<String>,
}

impl AnalysisRequest {
    /// Request for a dependency list with no project license.
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            project_license: None,
        }
    }

    /// Set the project license.
    pub fn with_project_license(mut self, license: impl Into<String>) -> Self {
        self.project_license = Some(license.into());
        self
    }
}

/// Registry metadata for one `name@version`, built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedInfo {
    /// Normalized license, `UNKNOWN` when absent.
    pub license: String,
    /// Whether the version is deprecated.
    pub deprecated: bool,
    /// Declared install-time hooks.
    pub install_hooks: Vec<InstallHook>,
    /// Whether the metadata lookup failed.
    pub fetch_failed: bool,
}

impl EnrichedInfo {
    /// Marker for a failed lookup.
    pub fn failed() -> Self {
        Self {
            license: UNKNOWN_LICENSE.to_string(),
            deprecated: false,
            install_hooks: Vec::new(),
            fetch_failed: true,
        }
    }

    /// Whether any of preinstall/install/postinstall is declared.
    pub fn has_install_scripts(&self) -> bool {
        !self.install_hooks.is_empty()
    }
}

impl From<VersionMetadata> for EnrichedInfo {
    fn from(meta: VersionMetadata) -> Self {
        Self {
            license: meta.license,
            deprecated: meta.deprecated,
            install_hooks: meta.install_hooks,
            fetch_failed: false,
        }
    }
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Must be addressed.
    Critical,
    /// Should be reviewed.
    Warning,
    /// Informational.
    Info,
}

impl IssueLevel {
    /// Get the level name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueLevel::Critical => "critical",
            IssueLevel::Warning => "warning",
            IssueLevel::Info => "info",
        }
    }
}

impl From<Severity> for IssueLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => IssueLevel::Critical,
            Severity::Warning => IssueLevel::Warning,
            Severity::Info => IssueLevel::Info,
        }
    }
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of risk an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Known vulnerability.
    Vuln,
    /// Deprecated version.
    Deprecated,
    /// Install-time scripts.
    Scripts,
    /// License conflict with the project.
    License,
    /// Name close to a popular package.
    Typosquat,
    /// Safe update available.
    Update,
    /// Metadata could not be fetched.
    Meta,
}

impl IssueKind {
    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Vuln => "vuln",
            IssueKind::Deprecated => "deprecated",
            IssueKind::Scripts => "scripts",
            IssueKind::License => "license",
            IssueKind::Typosquat => "typosquat",
            IssueKind::Update => "update",
            IssueKind::Meta => "meta",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single finding on a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Severity.
    pub level: IssueLevel,
    /// Category.
    pub kind: IssueKind,
    /// Human-readable description, at most [`MAX_MESSAGE_LEN`] characters.
    pub message: String,
    /// Suggested replacement spec (`name@version`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Issue {
    /// Create an issue, truncating the message if needed.
    pub fn new(level: IssueLevel, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: truncate_message(message.into()),
            fix: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

fn truncate_message(message: String) -> String {
    if message.chars().count() <= MAX_MESSAGE_LEN {
        return message;
    }
    let mut truncated: String = message.chars().take(MAX_MESSAGE_LEN - 1).collect();
    truncated.push('…');
    truncated
}

/// Analysis outcome for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyResult {
    /// Package name.
    pub name: String,
    /// Resolved version.
    pub version: String,
    /// Range from the manifest.
    #[serde(default)]
    pub requested_range: Option<String>,
    /// Normalized license.
    pub license: String,
    /// `latest` dist-tag, if the lookup succeeded.
    #[serde(default)]
    pub latest_version: Option<String>,
    /// Issues in detector pipeline order.
    pub issues: Vec<Issue>,
}

/// Overall letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    /// No warnings or critical issues.
    A,
    /// Warnings but nothing critical.
    B,
    /// At least one critical issue.
    C,
}

impl Score {
    /// Get the grade as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Score::A => "A",
            Score::B => "B",
            Score::C => "C",
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the license histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCount {
    /// License string.
    pub license: String,
    /// Number of analyzed dependencies carrying it.
    pub count: usize,
}

/// The full analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Letter grade.
    pub score: Score,
    /// Dependencies analyzed after dedup and cap.
    pub analyzed_count: usize,
    /// Distinct dependencies in the input, before the cap.
    pub total_input_count: usize,
    /// Whether the cap truncated the input.
    pub is_limited: bool,
    /// Critical issues across all results.
    pub critical_count: usize,
    /// Warnings across all results.
    pub warning_count: usize,
    /// Info issues across all results.
    pub info_count: usize,
    /// Project license, passed through from the request.
    #[serde(default)]
    pub project_license: Option<String>,
    /// Up to ten most common licenses.
    pub top_licenses: Vec<LicenseCount>,
    /// Per-dependency results in input order.
    pub results: Vec<DependencyResult>,
}

impl Report {
    /// All fix suggestions, in result order.
    pub fn fixes(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .flat_map(|r| r.issues.iter())
            .filter_map(|i| i.fix.as_deref())
            .filter(|f| !f.is_empty())
    }

    /// Fix suggestions joined with spaces, ready for `npm install`.
    pub fn fixes_joined(&self) -> String {
        self.fixes().collect::<Vec<_>>().join(" ")
    }

    /// Total issue count.
    pub fn issue_count(&self) -> usize {
        self.critical_count + self.warning_count + self.info_count
    }
}
