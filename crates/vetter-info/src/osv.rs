//! OSV batch advisory client

use crate::client::{ClientOptions, HttpClient};
use crate::error::{Error, Result};
use crate::traits::AdvisorySource;
use crate::types::{Advisory, PackageQuery, Severity};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Public OSV API
pub const OSV_API_URL: &str = "https://api.osv.dev";

/// Ecosystem name OSV uses for npm packages
pub const NPM_ECOSYSTEM: &str = "npm";

/// Default timeout for one batch request
pub const ADVISORY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    queries: Vec<OsvQuery<'a>>,
}

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    #[serde(default)]
    vulns: Option<Vec<OsvVulnerability>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    severity: Option<Vec<OsvSeverity>>,
    #[serde(default)]
    affected: Option<Vec<OsvAffected>>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    kind: String,
    score: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvAffected {
    #[serde(default)]
    package: Option<OsvAffectedPackage>,
    #[serde(default)]
    ranges: Option<Vec<OsvRange>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvAffectedPackage {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvRange {
    #[serde(default)]
    events: Vec<OsvEvent>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsvEvent {
    #[serde(default)]
    fixed: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>,
}

impl OsvVulnerability {
    /// `querybatch` answers with only `id` and `modified` per vulnerability
    fn is_sparse(&self) -> bool {
        self.summary.is_none()
            && self.details.is_none()
            && self.severity.is_none()
            && self.affected.is_none()
            && self.database_specific.is_none()
    }

    fn into_advisory(self, package: &str) -> Advisory {
        let cvss = self
            .severity
            .iter()
            .flatten()
            .find(|s| s.kind.eq_ignore_ascii_case("CVSS_V3"))
            .and_then(|s| s.score.trim().parse::<f64>().ok());
        let label = self
            .database_specific
            .as_ref()
            .and_then(|d| d.severity.as_deref());
        let severity = classify_severity(cvss, label);

        let fixed_version = lowest_fixed_version(self.affected.as_deref().unwrap_or_default(), package);

        let summary = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.details
                    .as_deref()
                    .and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
                    .map(String::from)
            })
            .unwrap_or_else(|| self.id.clone());

        Advisory {
            id: self.id,
            summary,
            severity,
            fixed_version,
        }
    }
}

/// Map a CVSS v3 base score or a textual label onto [`Severity`]
///
/// The numeric score wins when present; GHSA's `moderate` counts as medium.
pub fn classify_severity(cvss: Option<f64>, label: Option<&str>) -> Severity {
    if let Some(score) = cvss {
        return if score >= 7.0 {
            Severity::Critical
        } else if score >= 4.0 {
            Severity::Warning
        } else {
            Severity::Info
        };
    }

    match label.map(|l| l.trim().to_ascii_lowercase()) {
        Some(l) if l == "critical" || l == "high" => Severity::Critical,
        Some(l) if l == "medium" || l == "moderate" => Severity::Warning,
        Some(_) => Severity::Info,
        None => Severity::Warning,
    }
}

/// Lowest `fixed` event across the ranges that target `package`
fn lowest_fixed_version(affected: &[OsvAffected], package: &str) -> Option<String> {
    let fixed: Vec<&str> = affected
        .iter()
        .filter(|a| a.package.as_ref().is_none_or(|p| p.name == package))
        .flat_map(|a| a.ranges.iter().flatten())
        .flat_map(|r| r.events.iter())
        .filter_map(|e| e.fixed.as_deref())
        .collect();

    let lowest_parsed = fixed
        .iter()
        .filter_map(|v| node_semver::Version::parse(v).ok().map(|parsed| (parsed, *v)))
        .min_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw);

    lowest_parsed.or_else(|| fixed.first().copied()).map(String::from)
}

/// Client for the OSV `querybatch` endpoint
#[derive(Debug, Clone)]
pub struct OsvClient {
    client: HttpClient,
    base_url: String,
}

impl OsvClient {
    /// Client for the public OSV API with the default 10s batch timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = HttpClient::with_options(&ClientOptions::with_timeout(ADVISORY_TIMEOUT))?;
        Self::with_client(client, OSV_API_URL)
    }

    /// Client for an arbitrary OSV-compatible endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn with_client(client: HttpClient, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn batch_url(&self) -> String {
        format!("{}/v1/querybatch", self.base_url)
    }

    fn vuln_url(&self, id: &str) -> String {
        format!("{}/v1/vulns/{}", self.base_url, id)
    }

    /// Replace sparse batch entries with the full record from `/v1/vulns/{id}`
    ///
    /// Each distinct id is fetched once. A failed fetch keeps the sparse entry.
    async fn hydrate(&self, results: &mut [Vec<OsvVulnerability>]) {
        let mut ids: Vec<String> = results
            .iter()
            .flatten()
            .filter(|v| v.is_sparse())
            .map(|v| v.id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return;
        }

        let urls: Vec<String> = ids.iter().map(|id| self.vuln_url(id)).collect();
        let fetched = join_all(
            urls.iter()
                .map(|url| self.client.get_json::<OsvVulnerability>(url)),
        )
        .await;

        let mut full: HashMap<String, OsvVulnerability> = HashMap::with_capacity(ids.len());
        for (id, outcome) in ids.into_iter().zip(fetched) {
            match outcome {
                Ok(record) => {
                    full.insert(id, record);
                }
                Err(e) => debug!(advisory = %id, error = %e, "advisory detail lookup failed"),
            }
        }

        for vuln in results.iter_mut().flatten() {
            if vuln.is_sparse() {
                if let Some(record) = full.get(&vuln.id) {
                    *vuln = record.clone();
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl AdvisorySource for OsvClient {
    async fn query_batch(&self, queries: &[PackageQuery]) -> Result<Vec<Vec<Advisory>>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchRequest {
            queries: queries
                .iter()
                .map(|q| OsvQuery {
                    package: OsvPackage {
                        name: &q.name,
                        ecosystem: NPM_ECOSYSTEM,
                    },
                    version: &q.version,
                })
                .collect(),
        };

        let response: BatchResponse = self.client.post_json(&self.batch_url(), &request).await?;

        if response.results.len() != queries.len() {
            return Err(Error::MisalignedResponse {
                expected: queries.len(),
                actual: response.results.len(),
            });
        }

        let mut results: Vec<Vec<OsvVulnerability>> = response
            .results
            .into_iter()
            .map(|result| result.vulns.unwrap_or_default())
            .collect();
        self.hydrate(&mut results).await;

        Ok(results
            .into_iter()
            .zip(queries)
            .map(|(vulns, query)| {
                vulns
                    .into_iter()
                    .map(|v| v.into_advisory(&query.name))
                    .collect()
            })
            .collect())
    }
}
