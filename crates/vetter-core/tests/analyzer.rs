//! End-to-end analyzer tests against in-memory sources

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use vetter_core::detectors::TyposquatDetector;
use vetter_core::{
    AnalysisRequest, Analyzer, AnalyzerConfig, CancellationToken, Dependency, DetectionContext,
    Detector, DetectorPipeline, Error, Issue, IssueKind, IssueLevel, Score,
};
use vetter_info::{
    Advisory, AdvisorySource, Error as InfoError, InstallHook, PackageQuery, RegistrySource,
    Result, Severity, VersionMetadata,
};

/// Registry backed by fixed maps; anything missing is a 404
#[derive(Default)]
struct FakeRegistry {
    latest: HashMap<String, String>,
    metadata: HashMap<String, VersionMetadata>,
    delay: Option<Duration>,
    metadata_calls: AtomicUsize,
}

impl FakeRegistry {
    fn latest(mut self, name: &str, version: &str) -> Self {
        self.latest.insert(name.to_string(), version.to_string());
        self
    }

    fn package(mut self, name: &str, version: &str, meta: VersionMetadata) -> Self {
        self.metadata.insert(format!("{}@{}", name, version), meta);
        self
    }

    fn licensed(self, name: &str, version: &str, license: &str) -> Self {
        self.package(
            name,
            version,
            VersionMetadata {
                license: license.to_string(),
                ..VersionMetadata::default()
            },
        )
    }
}

#[async_trait::async_trait]
impl RegistrySource for FakeRegistry {
    async fn latest_version(&self, name: &str) -> Result<Option<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.latest
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| InfoError::NotFound(name.to_string()))
    }

    async fn version_metadata(&self, name: &str, version: &str) -> Result<VersionMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.metadata
            .get(&format!("{}@{}", name, version))
            .cloned()
            .ok_or_else(|| InfoError::NotFound(format!("{}@{}", name, version)))
    }
}

/// Wraps a registry in a 2 rps limiter that hands out one slot per `ready`
struct PacedRegistry {
    inner: FakeRegistry,
    next_slot: Mutex<Option<Instant>>,
    admitted: AtomicUsize,
}

impl PacedRegistry {
    const INTERVAL: Duration = Duration::from_millis(500);

    fn new(inner: FakeRegistry) -> Self {
        Self {
            inner,
            next_slot: Mutex::new(None),
            admitted: AtomicUsize::new(0),
        }
    }

    async fn wait_for_slot(&self) {
        let slot = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = next.map_or(now, |next| next.max(now));
            *next = Some(slot + Self::INTERVAL);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    async fn admit(&self) {
        let prepaid = self
            .admitted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !prepaid {
            self.wait_for_slot().await;
        }
    }
}

#[async_trait::async_trait]
impl RegistrySource for PacedRegistry {
    async fn ready(&self) {
        self.wait_for_slot().await;
        self.admitted.fetch_add(1, Ordering::SeqCst);
    }

    async fn latest_version(&self, name: &str) -> Result<Option<String>> {
        self.admit().await;
        self.inner.latest_version(name).await
    }

    async fn version_metadata(&self, name: &str, version: &str) -> Result<VersionMetadata> {
        self.admit().await;
        self.inner.version_metadata(name, version).await
    }
}

/// Flags every dependency whose name starts with `internal-`
struct InternalNameDetector;

impl Detector for InternalNameDetector {
    fn name(&self) -> &'static str {
        "internal-name"
    }

    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        if ctx.dependency.name.starts_with("internal-") {
            vec![Issue::new(
                IssueLevel::Warning,
                IssueKind::Meta,
                "Internal package published to a public registry",
            )]
        } else {
            Vec::new()
        }
    }
}

/// Advisory service that is either down or answers from a fixed map
struct FakeAdvisories {
    up: bool,
    known: HashMap<String, Vec<Advisory>>,
    batches: Mutex<Vec<usize>>,
}

impl FakeAdvisories {
    fn down() -> Self {
        Self {
            up: false,
            known: HashMap::new(),
            batches: Mutex::new(Vec::new()),
        }
    }

    fn up() -> Self {
        Self {
            up: true,
            ..Self::down()
        }
    }

    fn with(mut self, spec: &str, advisory: Advisory) -> Self {
        self.known.entry(spec.to_string()).or_default().push(advisory);
        self
    }
}

#[async_trait::async_trait]
impl AdvisorySource for FakeAdvisories {
    async fn query_batch(&self, queries: &[PackageQuery]) -> Result<Vec<Vec<Advisory>>> {
        self.batches.lock().push(queries.len());
        if !self.up {
            return Err(InfoError::Status {
                status: 503,
                url: "http://advisories.test/v1/querybatch".to_string(),
            });
        }
        Ok(queries
            .iter()
            .map(|q| self.known.get(&q.spec()).cloned().unwrap_or_default())
            .collect())
    }
}

fn fast_config() -> AnalyzerConfig {
    AnalyzerConfig {
        advisory_pacing: Duration::ZERO,
        ..AnalyzerConfig::default()
    }
}

#[tokio::test]
async fn test_minimist_with_advisory_service_down() {
    let registry = FakeRegistry::default()
        .latest("minimist", "1.2.8")
        .licensed("minimist", "1.2.5", "MIT");
    let analyzer = Analyzer::new(registry, FakeAdvisories::down());

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("minimist", "1.2.5")]))
        .await;

    assert_eq!(report.score, Score::C);
    assert_eq!(report.critical_count, 1);

    let issues = &report.results[0].issues;
    let vuln: Vec<_> = issues.iter().filter(|i| i.kind == IssueKind::Vuln).collect();
    assert_eq!(vuln.len(), 1);
    assert_eq!(vuln[0].level, IssueLevel::Critical);
    assert!(vuln[0].message.contains("CVE-2020-7598"));
    assert_eq!(vuln[0].fix.as_deref(), Some("minimist@1.2.8"));
}

#[tokio::test]
async fn test_reachable_service_with_no_advisories_skips_fallback() {
    let registry = FakeRegistry::default()
        .latest("minimist", "1.2.5")
        .licensed("minimist", "1.2.5", "MIT");
    let advisories = Arc::new(FakeAdvisories::up());
    let analyzer = Analyzer::new(registry, Arc::clone(&advisories));

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("minimist", "1.2.5")]))
        .await;

    assert_eq!(report.score, Score::A);
    assert!(report.results[0].issues.is_empty());
    assert_eq!(*advisories.batches.lock(), vec![1]);
}

#[tokio::test]
async fn test_live_advisories_are_reported() {
    let advisories = FakeAdvisories::up().with(
        "lodash@4.17.20",
        Advisory {
            id: "GHSA-35jh-r3h4-6jhm".to_string(),
            summary: "Command Injection in lodash".to_string(),
            severity: Severity::Warning,
            fixed_version: Some("4.17.21".to_string()),
        },
    );
    let registry = FakeRegistry::default()
        .latest("lodash", "4.17.21")
        .licensed("lodash", "4.17.20", "MIT");
    let analyzer = Analyzer::new(registry, advisories);

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("lodash", "4.17.20")]))
        .await;

    assert_eq!(report.score, Score::B);
    let kinds: Vec<_> = report.results[0].issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::Vuln, IssueKind::Update]);
    assert_eq!(report.fixes_joined(), "lodash@4.17.21 lodash@4.17.21");
}

#[tokio::test]
async fn test_dedup_and_cap() {
    let mut deps: Vec<_> = (0..650)
        .map(|i| Dependency::new(format!("pkg-{}", i), "1.0.0"))
        .collect();
    deps.push(Dependency::new("pkg-0", "1.0.0"));
    deps.insert(1, Dependency::new("pkg-0", "1.0.0"));

    let registry = Arc::new(FakeRegistry::default());
    let analyzer =
        Analyzer::new(Arc::clone(&registry), FakeAdvisories::up()).with_config(fast_config());

    let report = analyzer.analyze(AnalysisRequest::new(deps)).await;

    assert_eq!(report.analyzed_count, 600);
    assert_eq!(report.total_input_count, 650);
    assert!(report.is_limited);
    assert_eq!(report.results[0].name, "pkg-0");
    assert_eq!(report.results[1].name, "pkg-1");
    assert_eq!(registry.metadata_calls.load(Ordering::SeqCst), 600);
}

#[tokio::test]
async fn test_failed_metadata_yields_meta_issue() {
    let analyzer = Analyzer::new(FakeRegistry::default(), FakeAdvisories::up());

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("ghost", "1.0.0")]))
        .await;

    let result = &report.results[0];
    assert_eq!(result.license, "UNKNOWN");
    assert_eq!(result.latest_version, None);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].kind, IssueKind::Meta);
    assert_eq!(result.issues[0].level, IssueLevel::Info);
    assert_eq!(report.score, Score::A);
}

#[tokio::test]
async fn test_issue_order_and_determinism() {
    let registry = FakeRegistry::default()
        .latest("reactt", "1.3.0")
        .package(
            "reactt",
            "1.2.3",
            VersionMetadata {
                license: "GPL-3.0".to_string(),
                deprecated: true,
                install_hooks: vec![InstallHook::PreInstall, InstallHook::PostInstall],
            },
        );
    let advisories = FakeAdvisories::up().with(
        "reactt@1.2.3",
        Advisory {
            id: "GHSA-test".to_string(),
            summary: "Malicious package".to_string(),
            severity: Severity::Critical,
            fixed_version: None,
        },
    );
    let analyzer = Analyzer::new(registry, advisories);
    let request = AnalysisRequest::new(vec![Dependency::new("reactt", "1.2.3")])
        .with_project_license("MIT");

    let first = analyzer.analyze(request.clone()).await;
    let second = analyzer.analyze(request).await;
    assert_eq!(first, second);

    let kinds: Vec<_> = first.results[0].issues.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::Deprecated,
            IssueKind::Scripts,
            IssueKind::License,
            IssueKind::Vuln,
            IssueKind::Typosquat,
            IssueKind::Update,
        ]
    );
    assert_eq!(first.score, Score::C);
    assert_eq!(first.critical_count, 1);
    assert_eq!(first.warning_count, 4);
    assert_eq!(first.info_count, 1);
}

#[tokio::test]
async fn test_update_gating_examples() {
    let registry = FakeRegistry::default()
        .latest("minor-pkg", "1.3.0")
        .licensed("minor-pkg", "1.2.3", "MIT")
        .latest("major-pkg", "2.0.0")
        .licensed("major-pkg", "1.2.3", "MIT")
        .latest("tilde-pkg", "1.3.0")
        .licensed("tilde-pkg", "1.2.3", "MIT");
    let analyzer = Analyzer::new(registry, FakeAdvisories::up());

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![
            Dependency::new("minor-pkg", "1.2.3"),
            Dependency::new("major-pkg", "1.2.3"),
            Dependency::new("tilde-pkg", "1.2.3").with_range("~1.2.0"),
        ]))
        .await;

    let minor = &report.results[0].issues;
    assert_eq!(minor.len(), 1);
    assert_eq!(minor[0].kind, IssueKind::Update);
    assert_eq!(minor[0].fix.as_deref(), Some("minor-pkg@1.3.0"));
    assert!(report.results[1].issues.is_empty());
    assert!(report.results[2].issues.is_empty());
    assert_eq!(report.fixes_joined(), "minor-pkg@1.3.0");
}

#[tokio::test]
async fn test_license_examples_and_histogram() {
    let registry = FakeRegistry::default()
        .latest("gpl-dep", "1.0.0")
        .licensed("gpl-dep", "1.0.0", "GPL-3.0")
        .latest("lgpl-dep", "1.0.0")
        .licensed("lgpl-dep", "1.0.0", "LGPL-2.1")
        .latest("mit-a", "1.0.0")
        .licensed("mit-a", "1.0.0", "MIT")
        .latest("mit-b", "1.0.0")
        .licensed("mit-b", "1.0.0", "MIT");
    let analyzer = Analyzer::new(registry, FakeAdvisories::up());

    let report = analyzer
        .analyze(
            AnalysisRequest::new(vec![
                Dependency::new("gpl-dep", "1.0.0"),
                Dependency::new("lgpl-dep", "1.0.0"),
                Dependency::new("mit-a", "1.0.0"),
                Dependency::new("mit-b", "1.0.0"),
            ])
            .with_project_license("MIT"),
        )
        .await;

    assert_eq!(report.results[0].issues[0].level, IssueLevel::Warning);
    assert_eq!(report.results[1].issues[0].level, IssueLevel::Info);
    assert!(report.results[2].issues.is_empty());
    assert_eq!(report.score, Score::B);
    assert_eq!(report.project_license.as_deref(), Some("MIT"));

    let top: Vec<_> = report
        .top_licenses
        .iter()
        .map(|l| (l.license.as_str(), l.count))
        .collect();
    assert_eq!(top, vec![("MIT", 2), ("GPL-3.0", 1), ("LGPL-2.1", 1)]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_registry_times_out() {
    let registry = FakeRegistry {
        delay: Some(Duration::from_secs(60)),
        ..FakeRegistry::default()
    }
    .latest("slow", "2.0.0")
    .licensed("slow", "1.0.0", "MIT");
    let analyzer = Analyzer::new(registry, FakeAdvisories::up());

    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("slow", "1.0.0")]))
        .await;

    let result = &report.results[0];
    assert_eq!(result.latest_version, None);
    assert_eq!(result.issues[0].kind, IssueKind::Meta);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_registry_does_not_time_out() {
    // 7 packages: 7 dist-tag and 7 metadata lookups, the last admitted at 6.5s
    let mut registry = FakeRegistry::default();
    let mut deps = Vec::new();
    for i in 0..7 {
        let name = format!("pkg-{}", i);
        registry = registry.latest(&name, "1.0.0").licensed(&name, "1.0.0", "MIT");
        deps.push(Dependency::new(name, "1.0.0"));
    }
    let analyzer =
        Analyzer::new(PacedRegistry::new(registry), FakeAdvisories::up()).with_config(fast_config());

    let report = analyzer.analyze(AnalysisRequest::new(deps)).await;

    assert_eq!(report.analyzed_count, 7);
    for result in &report.results {
        assert_eq!(result.latest_version.as_deref(), Some("1.0.0"));
        assert_eq!(result.license, "MIT");
        assert!(result.issues.iter().all(|i| i.kind != IssueKind::Meta));
    }
}

#[tokio::test]
async fn test_custom_pipeline_replaces_standard_detectors() {
    let registry = FakeRegistry::default()
        .latest("internal-auth", "2.0.0")
        .package(
            "internal-auth",
            "1.0.0",
            VersionMetadata {
                license: "GPL-3.0".to_string(),
                deprecated: true,
                install_hooks: vec![InstallHook::PostInstall],
            },
        )
        .latest("reactt", "1.0.0")
        .licensed("reactt", "1.0.0", "MIT");
    let pipeline = DetectorPipeline::from_detectors(vec![
        Box::new(InternalNameDetector),
        Box::new(TyposquatDetector),
    ]);
    assert_eq!(pipeline.names(), vec!["internal-name", "typosquat"]);

    let analyzer = Analyzer::new(registry, FakeAdvisories::up())
        .with_config(fast_config())
        .with_pipeline(pipeline);
    let report = analyzer
        .analyze(
            AnalysisRequest::new(vec![
                Dependency::new("internal-auth", "1.0.0"),
                Dependency::new("reactt", "1.0.0"),
            ])
            .with_project_license("MIT"),
        )
        .await;

    let internal = report.results.iter().find(|r| r.name == "internal-auth").unwrap();
    assert_eq!(internal.issues.len(), 1);
    assert_eq!(
        internal.issues[0].message,
        "Internal package published to a public registry"
    );

    let typo = report.results.iter().find(|r| r.name == "reactt").unwrap();
    assert_eq!(typo.issues.len(), 1);
    assert_eq!(typo.issues[0].kind, IssueKind::Typosquat);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let analyzer = Analyzer::new(FakeRegistry::default(), FakeAdvisories::up());
    let token = CancellationToken::new();
    token.cancel();

    let result = analyzer
        .analyze_with_cancellation(
            AnalysisRequest::new(vec![Dependency::new("a", "1.0.0")]),
            &token,
        )
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_mid_flight() {
    let registry = FakeRegistry {
        delay: Some(Duration::from_secs(3)),
        ..FakeRegistry::default()
    };
    let analyzer = Analyzer::new(registry, FakeAdvisories::up());
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        })
    };

    let result = analyzer
        .analyze_with_cancellation(
            AnalysisRequest::new(vec![Dependency::new("a", "1.0.0")]),
            &token,
        )
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_uncancelled_analysis_completes() {
    let analyzer = Analyzer::new(FakeRegistry::default(), FakeAdvisories::up());
    let token = CancellationToken::new();

    let report = analyzer
        .analyze_with_cancellation(AnalysisRequest::default(), &token)
        .await
        .unwrap();
    assert_eq!(report.analyzed_count, 0);
    assert_eq!(report.score, Score::A);
    assert!(!report.is_limited);
}

#[tokio::test]
async fn test_report_serializes_camel_case() {
    let analyzer = Analyzer::new(FakeRegistry::default(), FakeAdvisories::down());
    let report = analyzer
        .analyze(AnalysisRequest::new(vec![Dependency::new("minimist", "1.2.5")]))
        .await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["score"], "C");
    assert_eq!(json["analyzedCount"], 1);
    assert_eq!(json["totalInputCount"], 1);
    assert_eq!(json["isLimited"], false);
    assert_eq!(json["criticalCount"], 1);
    assert_eq!(json["results"][0]["issues"][0]["kind"], "meta");
    assert_eq!(json["results"][0]["issues"][1]["kind"], "vuln");
    assert_eq!(json["results"][0]["issues"][1]["fix"], "minimist@1.2.8");
}
