//! Engine settings.

use std::time::Duration;

/// Hard cap on analyzed dependencies.
pub const MAX_PACKAGES: usize = 600;
/// Window size for dist-tag lookups.
pub const DIST_TAG_CONCURRENCY: usize = 8;
/// Window size for version metadata lookups.
pub const METADATA_CONCURRENCY: usize = 6;
/// Deadline for a single registry lookup.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
/// Queries per advisory sub-batch.
pub const ADVISORY_BATCH_SIZE: usize = 10;
/// Deadline for one advisory sub-batch.
pub const ADVISORY_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between advisory sub-batches.
pub const ADVISORY_PACING: Duration = Duration::from_millis(100);

/// Settings injected into an [`Analyzer`](crate::Analyzer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Distinct dependencies analyzed before truncation.
    pub max_packages: usize,
    /// Concurrent dist-tag lookups per window.
    pub dist_tag_concurrency: usize,
    /// Concurrent version metadata lookups per window.
    pub metadata_concurrency: usize,
    /// Deadline for each registry lookup.
    pub metadata_timeout: Duration,
    /// Queries per advisory sub-batch.
    pub advisory_batch_size: usize,
    /// Deadline for each advisory sub-batch.
    pub advisory_timeout: Duration,
    /// Pause between advisory sub-batches; zero disables pacing.
    pub advisory_pacing: Duration,
    /// Query the live advisory service; `false` uses the built-in table only.
    pub live_advisories: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_packages: MAX_PACKAGES,
            dist_tag_concurrency: DIST_TAG_CONCURRENCY,
            metadata_concurrency: METADATA_CONCURRENCY,
            metadata_timeout: METADATA_TIMEOUT,
            advisory_batch_size: ADVISORY_BATCH_SIZE,
            advisory_timeout: ADVISORY_TIMEOUT,
            advisory_pacing: ADVISORY_PACING,
            live_advisories: true,
        }
    }
}

impl AnalyzerConfig {
    /// Clamp zero-sized windows and batches to one.
    pub fn normalized(mut self) -> Self {
        self.dist_tag_concurrency = self.dist_tag_concurrency.max(1);
        self.metadata_concurrency = self.metadata_concurrency.max(1);
        self.advisory_batch_size = self.advisory_batch_size.max(1);
        self
    }
}
