//! Vetter Core - dependency risk analysis engine.
//!
//! Given a flat, already-resolved list of npm dependencies, the engine
//! produces a single [`Report`]: per-dependency issues, issue counts, a
//! letter grade and a license histogram.
//!
//! # Pipeline
//!
//! ```text
//! input ──► dedupe & cap ──┬─► dist-tags        (windows of 8)  ──┐
//!                          ├─► version metadata (windows of 6)  ──┼─► detectors ──► scorer ──► Report
//!                          └─► advisories       (batches of 10) ──┘
//! ```
//!
//! External services are reached only through the
//! [`RegistrySource`](vetter_info::RegistrySource) and
//! [`AdvisorySource`](vetter_info::AdvisorySource) traits. Every lookup has
//! its own deadline, and a failed lookup degrades one result instead of
//! failing the analysis.
//!
//! # Example
//!
//! ```no_run
//! use vetter_core::{AnalysisRequest, Analyzer, Dependency};
//! use vetter_info::{NpmRegistry, OsvClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = Analyzer::new(NpmRegistry::new()?, OsvClient::new()?);
//!
//!     let request = AnalysisRequest::new(vec![
//!         Dependency::new("minimist", "1.2.5"),
//!         Dependency::new("react", "18.2.0").with_range("^18.0.0"),
//!     ])
//!     .with_project_license("MIT");
//!
//!     let report = analyzer.analyze(request).await;
//!     println!("score {} ({} issues)", report.score, report.issue_count());
//!     println!("npm install {}", report.fixes_joined());
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod dedupe;
pub mod detectors;
pub mod enrichment;
pub mod error;
pub mod fallback;
pub mod scorer;
pub mod types;
pub mod version;
pub mod vulnerabilities;

pub use analyzer::Analyzer;
pub use batch::{with_deadline, BatchScheduler};
pub use config::AnalyzerConfig;
pub use dedupe::{dedupe_and_cap, CappedInput};
pub use detectors::{DetectionContext, Detector, DetectorPipeline};
pub use error::{Error, Result};
pub use fallback::{known_advisories, KnownAdvisory, KNOWN_ADVISORIES};
pub use scorer::IssueCounts;
pub use types::{
    AnalysisRequest, Dependency, DependencyResult, EnrichedInfo, Issue, IssueKind, IssueLevel,
    LicenseCount, Report, Score, MAX_MESSAGE_LEN,
};
pub use version::{compare_versions, range_satisfied, version_diff, VersionDiff};
pub use vulnerabilities::{AdvisoryLookup, AdvisoryOrigin, VulnerabilityResolver};

// Re-exported so callers can cancel without naming tokio-util
pub use tokio_util::sync::CancellationToken;
