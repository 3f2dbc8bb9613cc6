//! Built-in advisory table used when the live advisory service is unavailable.

use crate::version::range_satisfied;
use vetter_info::{Advisory, Severity};

/// A well-known npm advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownAdvisory {
    /// Affected package.
    pub name: &'static str,
    /// Affected versions, as an npm range.
    pub range: &'static str,
    /// Version that fixes it.
    pub fixed_version: &'static str,
    /// Advisory identifier.
    pub id: &'static str,
    /// Short description.
    pub summary: &'static str,
}

impl KnownAdvisory {
    /// Whether `version` falls inside the affected range.
    ///
    /// Unparseable ranges or versions never match.
    pub fn affects(&self, version: &str) -> bool {
        range_satisfied(self.range, version).unwrap_or(false)
    }

    /// Advisory as reported by the resolver.
    pub fn to_advisory(&self) -> Advisory {
        Advisory {
            id: self.id.to_string(),
            summary: self.summary.to_string(),
            severity: Severity::Critical,
            fixed_version: Some(self.fixed_version.to_string()),
        }
    }
}

/// Advisories known without network access.
pub static KNOWN_ADVISORIES: &[KnownAdvisory] = &[
    KnownAdvisory {
        name: "minimist",
        range: "<1.2.6",
        fixed_version: "1.2.8",
        id: "CVE-2020-7598",
        summary: "Prototype pollution",
    },
    KnownAdvisory {
        name: "lodash",
        range: "<4.17.21",
        fixed_version: "4.17.21",
        id: "CVE-2021-23337",
        summary: "Command injection via template",
    },
    KnownAdvisory {
        name: "axios",
        range: "<0.21.2",
        fixed_version: "0.21.2",
        id: "CVE-2021-3749",
        summary: "Regular expression denial of service",
    },
    KnownAdvisory {
        name: "node-fetch",
        range: "<2.6.7",
        fixed_version: "2.6.7",
        id: "CVE-2022-0235",
        summary: "Exposure of sensitive information to an unauthorized actor",
    },
    KnownAdvisory {
        name: "jsonwebtoken",
        range: "<9.0.0",
        fixed_version: "9.0.0",
        id: "CVE-2022-23529",
        summary: "Insecure key handling in jwt.verify",
    },
    KnownAdvisory {
        name: "json5",
        range: "<1.0.2",
        fixed_version: "1.0.2",
        id: "CVE-2022-46175",
        summary: "Prototype pollution in parse",
    },
    KnownAdvisory {
        name: "json5",
        range: ">=2.0.0 <2.2.2",
        fixed_version: "2.2.2",
        id: "CVE-2022-46175",
        summary: "Prototype pollution in parse",
    },
    KnownAdvisory {
        name: "semver",
        range: "<5.7.2",
        fixed_version: "5.7.2",
        id: "CVE-2022-25883",
        summary: "Regular expression denial of service",
    },
    KnownAdvisory {
        name: "semver",
        range: ">=6.0.0 <6.3.1",
        fixed_version: "6.3.1",
        id: "CVE-2022-25883",
        summary: "Regular expression denial of service",
    },
    KnownAdvisory {
        name: "semver",
        range: ">=7.0.0 <7.5.2",
        fixed_version: "7.5.2",
        id: "CVE-2022-25883",
        summary: "Regular expression denial of service",
    },
    KnownAdvisory {
        name: "qs",
        range: "<6.10.3",
        fixed_version: "6.10.3",
        id: "CVE-2022-24999",
        summary: "Prototype pollution",
    },
    KnownAdvisory {
        name: "tough-cookie",
        range: "<4.1.3",
        fixed_version: "4.1.3",
        id: "CVE-2023-26136",
        summary: "Prototype pollution",
    },
    KnownAdvisory {
        name: "word-wrap",
        range: "<1.2.4",
        fixed_version: "1.2.4",
        id: "CVE-2023-26115",
        summary: "Regular expression denial of service",
    },
];

/// Built-in advisories affecting `name@version`.
pub fn known_advisories(name: &str, version: &str) -> Vec<Advisory> {
    KNOWN_ADVISORIES
        .iter()
        .filter(|known| known.name == name && known.affects(version))
        .map(KnownAdvisory::to_advisory)
        .collect()
}
