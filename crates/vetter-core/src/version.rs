//! Version parsing and comparison for npm packages

use crate::{Error, Result};
use node_semver::{Range, Version};
use std::cmp::Ordering;

/// Parse an npm version
pub fn parse_version(raw: &str) -> Result<Version> {
    Version::parse(raw).map_err(|e| Error::InvalidVersion(raw.to_string(), e.to_string()))
}

/// Parse an npm range expression
pub fn parse_range(raw: &str) -> Result<Range> {
    Range::parse(raw).map_err(|e| Error::InvalidVersion(raw.to_string(), e.to_string()))
}

/// Compare two versions
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(parse_version(a)?.cmp(&parse_version(b)?))
}

/// Check whether `version` satisfies `range`
pub fn range_satisfied(range: &str, version: &str) -> Result<bool> {
    Ok(parse_range(range)?.satisfies(&parse_version(version)?))
}

/// Which component changed between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDiff {
    /// Major version bump (1.0.0 -> 2.0.0) - potentially breaking
    Major,
    /// Major bump landing on a prerelease (1.0.0 -> 2.0.0-rc.1)
    PreMajor,
    /// Minor version bump (1.0.0 -> 1.1.0) - new features
    Minor,
    /// Minor bump landing on a prerelease
    PreMinor,
    /// Patch version bump (1.0.0 -> 1.0.1) - bug fixes
    Patch,
    /// Patch bump landing on a prerelease
    PrePatch,
    /// Only the prerelease tag differs
    Prerelease,
}

impl VersionDiff {
    /// Get the diff name as npm reports it
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionDiff::Major => "major",
            VersionDiff::PreMajor => "premajor",
            VersionDiff::Minor => "minor",
            VersionDiff::PreMinor => "preminor",
            VersionDiff::Patch => "patch",
            VersionDiff::PrePatch => "prepatch",
            VersionDiff::Prerelease => "prerelease",
        }
    }

    /// Patch and minor bumps are the only ones suggested automatically
    pub fn is_safe_update(&self) -> bool {
        matches!(self, VersionDiff::Patch | VersionDiff::Minor)
    }
}

impl std::fmt::Display for VersionDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify the difference between two versions; `None` when they are equal.
///
/// Symmetric in its arguments. Mirrors npm's `semver.diff`, including the
/// special case of leaving a prerelease for its own release.
pub fn version_diff(a: &str, b: &str) -> Result<Option<VersionDiff>> {
    let v1 = parse_version(a)?;
    let v2 = parse_version(b)?;

    let (low, high) = match v1.cmp(&v2) {
        Ordering::Equal => return Ok(None),
        Ordering::Less => (&v1, &v2),
        Ordering::Greater => (&v2, &v1),
    };

    let high_pre = !high.pre_release.is_empty();
    let low_pre = !low.pre_release.is_empty();

    if low_pre && !high_pre {
        if low.patch == 0 && low.minor == 0 {
            return Ok(Some(VersionDiff::Major));
        }
        if (low.major, low.minor, low.patch) == (high.major, high.minor, high.patch) {
            if low.minor != 0 && low.patch == 0 {
                return Ok(Some(VersionDiff::Minor));
            }
            return Ok(Some(VersionDiff::Patch));
        }
    }

    let diff = if v1.major != v2.major {
        if high_pre {
            VersionDiff::PreMajor
        } else {
            VersionDiff::Major
        }
    } else if v1.minor != v2.minor {
        if high_pre {
            VersionDiff::PreMinor
        } else {
            VersionDiff::Minor
        }
    } else if v1.patch != v2.patch {
        if high_pre {
            VersionDiff::PrePatch
        } else {
            VersionDiff::Patch
        }
    } else {
        VersionDiff::Prerelease
    };

    Ok(Some(diff))
}
