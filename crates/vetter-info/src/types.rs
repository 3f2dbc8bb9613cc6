//! Core domain types for registry and advisory lookups

use serde::{Deserialize, Serialize};

/// License placeholder used whenever a manifest carries no usable license
pub const UNKNOWN_LICENSE: &str = "UNKNOWN";

/// A `(name, version)` pair sent to the advisory service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageQuery {
    /// Package name (e.g., "lodash" or "@types/node")
    pub name: String,
    /// Concrete resolved version
    pub version: String,
}

impl PackageQuery {
    /// Create a new query
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// `name@version` spec for this query
    pub fn spec(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Coarse severity classification of an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// CVSS >= 7.0, or labelled critical/high
    Critical,
    /// CVSS >= 4.0, labelled medium, or unlabelled
    Warning,
    /// Everything below
    Info,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A published security advisory affecting one package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    /// Advisory identifier (GHSA, CVE, ...)
    pub id: String,
    /// One-line description
    pub summary: String,
    /// Severity classification
    pub severity: Severity,
    /// Lowest version that fixes the issue, if known
    pub fixed_version: Option<String>,
}

/// npm lifecycle hooks that run code on install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallHook {
    /// `preinstall`
    PreInstall,
    /// `install`
    Install,
    /// `postinstall`
    PostInstall,
}

impl InstallHook {
    /// All hooks, in the order npm runs them
    pub const ALL: [InstallHook; 3] = [
        InstallHook::PreInstall,
        InstallHook::Install,
        InstallHook::PostInstall,
    ];

    /// Script key in `package.json`
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallHook::PreInstall => "preinstall",
            InstallHook::Install => "install",
            InstallHook::PostInstall => "postinstall",
        }
    }
}

impl std::fmt::Display for InstallHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized per-version registry metadata
///
/// The raw manifest is discarded once this is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Normalized license expression, `UNKNOWN` when absent
    pub license: String,
    /// Whether the version is marked deprecated
    pub deprecated: bool,
    /// Declared install-time hooks
    pub install_hooks: Vec<InstallHook>,
}

impl Default for VersionMetadata {
    fn default() -> Self {
        Self {
            license: UNKNOWN_LICENSE.to_string(),
            deprecated: false,
            install_hooks: Vec::new(),
        }
    }
}

/// License field as found in the wild in npm manifests
///
/// ```
/// use vetter_info::LicenseField;
///
/// let field: LicenseField = serde_json::from_str(r#"{"type": "MIT"}"#).unwrap();
/// assert_eq!(field.normalize().as_deref(), Some("MIT"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    /// `"license": "MIT"`
    Plain(String),
    /// `"licenses": [{"type": "MIT"}, "Apache-2.0"]`
    List(Vec<LicenseField>),
    /// `"license": {"type": "MIT", "url": "..."}`
    Typed {
        /// The SPDX-ish identifier
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    /// Anything else (numbers, booleans, objects without `type`)
    Other(serde_json::Value),
}

impl LicenseField {
    /// Collapse the field into a single license string
    ///
    /// Returns `None` when nothing usable is present.
    pub fn normalize(&self) -> Option<String> {
        match self {
            LicenseField::Plain(s) => non_empty(s),
            LicenseField::Typed { kind } => kind.as_deref().and_then(non_empty),
            LicenseField::List(items) => {
                let parts: Vec<String> = items.iter().filter_map(LicenseField::normalize).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" OR "))
                }
            }
            LicenseField::Other(_) => None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
