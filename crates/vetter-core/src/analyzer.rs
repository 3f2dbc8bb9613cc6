//! Analysis orchestration.

use crate::config::AnalyzerConfig;
use crate::dedupe::dedupe_and_cap;
use crate::detectors::{DetectionContext, DetectorPipeline};
use crate::enrichment::{fetch_enriched_infos, fetch_latest_versions};
use crate::error::{Error, Result};
use crate::scorer::build_report;
use crate::types::{AnalysisRequest, DependencyResult, EnrichedInfo, Report};
use crate::vulnerabilities::VulnerabilityResolver;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vetter_info::{AdvisorySource, RegistrySource};

/// Dependency risk analyzer over a registry and an advisory source.
///
/// Holds no per-analysis state; one analyzer can serve any number of
/// concurrent [`analyze`](Self::analyze) calls.
pub struct Analyzer<R, A> {
    registry: R,
    advisories: A,
    config: AnalyzerConfig,
    pipeline: DetectorPipeline,
}

impl<R: RegistrySource, A: AdvisorySource> Analyzer<R, A> {
    /// Analyzer with default settings and the standard detector pipeline.
    pub fn new(registry: R, advisories: A) -> Self {
        Self {
            registry,
            advisories,
            config: AnalyzerConfig::default(),
            pipeline: DetectorPipeline::standard(),
        }
    }

    /// Replace the engine settings.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config.normalized();
        self
    }

    /// Replace the detector pipeline.
    pub fn with_pipeline(mut self, pipeline: DetectorPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run a full analysis.
    ///
    /// External failures degrade individual results and never fail the
    /// analysis as a whole.
    pub async fn analyze(&self, request: AnalysisRequest) -> Report {
        let started = Instant::now();
        let AnalysisRequest {
            dependencies,
            project_license,
        } = request;

        let input = dedupe_and_cap(dependencies, self.config.max_packages);
        let deps = input.dependencies.as_slice();
        info!(
            analyzed = deps.len(),
            distinct = input.distinct_count,
            limited = input.is_limited,
            "starting dependency analysis"
        );

        let resolver = VulnerabilityResolver::new(&self.advisories, &self.config);
        let (latest, infos, advisories) = tokio::join!(
            fetch_latest_versions(
                &self.registry,
                deps,
                self.config.dist_tag_concurrency,
                self.config.metadata_timeout,
            ),
            fetch_enriched_infos(
                &self.registry,
                deps,
                self.config.metadata_concurrency,
                self.config.metadata_timeout,
            ),
            resolver.resolve(deps),
        );
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            fallback = advisories.used_fallback(),
            "enrichment complete"
        );

        let failed = EnrichedInfo::failed();
        let results: Vec<DependencyResult> = deps
            .iter()
            .map(|dep| {
                let info = infos.get(&dep.key()).unwrap_or(&failed);
                let latest_version = latest.get(&dep.name).and_then(|l| l.as_deref());

                let ctx = DetectionContext {
                    dependency: dep,
                    info,
                    latest_version,
                    advisories: advisories.for_dependency(dep),
                    project_license: project_license.as_deref(),
                };

                DependencyResult {
                    name: dep.name.clone(),
                    version: dep.version.clone(),
                    requested_range: dep.requested_range.clone(),
                    license: info.license.clone(),
                    latest_version: latest_version.map(str::to_string),
                    issues: self.pipeline.run(&ctx),
                }
            })
            .collect();

        let report = build_report(&input, project_license, results);
        info!(
            score = %report.score,
            critical = report.critical_count,
            warning = report.warning_count,
            info = report.info_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dependency analysis complete"
        );
        report
    }

    /// Run an analysis that stops as soon as `token` is cancelled.
    ///
    /// On cancellation every in-flight lookup is dropped and partial results
    /// are discarded.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if the token fires before the report is ready.
    pub async fn analyze_with_cancellation(
        &self,
        request: AnalysisRequest,
        token: &CancellationToken,
    ) -> Result<Report> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("dependency analysis cancelled");
                Err(Error::Cancelled)
            }
            report = self.analyze(request) => Ok(report),
        }
    }
}

impl<R, A> std::fmt::Debug for Analyzer<R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
