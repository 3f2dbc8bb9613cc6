use serde::{Deserialize, Serialize};
use std::time::Duration;
use vetter_core::{config as engine, AnalyzerConfig};
use vetter_info::{ClientOptions, NPM_REGISTRY_URL, OSV_API_URL};

/// Main configuration structure for vetter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VetterConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: String,

    /// npm registry settings
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Advisory service settings
    #[serde(default)]
    pub advisories: AdvisorySettings,

    /// Engine limits
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

impl Default for VetterConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry: RegistrySettings::default(),
            advisories: AdvisorySettings::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

impl VetterConfig {
    /// Engine settings derived from this file
    pub fn to_analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_packages: self.analysis.max_packages,
            dist_tag_concurrency: self.analysis.dist_tag_concurrency,
            metadata_concurrency: self.analysis.metadata_concurrency,
            metadata_timeout: Duration::from_millis(self.analysis.metadata_timeout_ms),
            advisory_batch_size: self.advisories.batch_size,
            advisory_timeout: Duration::from_millis(self.advisories.timeout_ms),
            advisory_pacing: Duration::from_millis(self.advisories.pacing_ms),
            live_advisories: self.advisories.live,
        }
        .normalized()
    }

    /// HTTP options for the registry client
    pub fn registry_client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::with_timeout(Duration::from_millis(
            self.analysis.metadata_timeout_ms,
        ));
        options.requests_per_second = self.registry.requests_per_second;
        if let Some(agent) = &self.registry.user_agent {
            options.user_agent = agent.clone();
        }
        options
    }

    /// HTTP options for the advisory client
    pub fn advisory_client_options(&self) -> ClientOptions {
        let mut options =
            ClientOptions::with_timeout(Duration::from_millis(self.advisories.timeout_ms));
        if let Some(agent) = &self.registry.user_agent {
            options.user_agent = agent.clone();
        }
        options
    }
}

/// npm registry settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Registry base URL
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Client-side request budget (unset disables rate limiting)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// User agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            requests_per_second: None,
            user_agent: None,
        }
    }
}

/// Advisory service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisorySettings {
    /// OSV API base URL
    #[serde(default = "default_advisory_url")]
    pub url: String,

    /// Queries per batch request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-batch timeout in milliseconds
    #[serde(default = "default_advisory_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause between batches in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Query the live service; `false` uses the built-in advisory table only
    #[serde(default = "default_true")]
    pub live: bool,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            url: default_advisory_url(),
            batch_size: default_batch_size(),
            timeout_ms: default_advisory_timeout_ms(),
            pacing_ms: default_pacing_ms(),
            live: default_true(),
        }
    }
}

/// Engine limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Distinct dependencies analyzed per run
    #[serde(default = "default_max_packages")]
    pub max_packages: usize,

    /// Concurrent dist-tag lookups
    #[serde(default = "default_dist_tag_concurrency")]
    pub dist_tag_concurrency: usize,

    /// Concurrent version metadata lookups
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,

    /// Per-lookup registry timeout in milliseconds
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Project license used when the input does not carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_license: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_packages: default_max_packages(),
            dist_tag_concurrency: default_dist_tag_concurrency(),
            metadata_concurrency: default_metadata_concurrency(),
            metadata_timeout_ms: default_metadata_timeout_ms(),
            project_license: None,
        }
    }
}

// Default value functions
fn default_version() -> String {
    "1.0".to_string()
}

fn default_registry_url() -> String {
    NPM_REGISTRY_URL.to_string()
}

fn default_advisory_url() -> String {
    OSV_API_URL.to_string()
}

fn default_batch_size() -> usize {
    engine::ADVISORY_BATCH_SIZE
}

fn default_advisory_timeout_ms() -> u64 {
    engine::ADVISORY_TIMEOUT.as_millis() as u64
}

fn default_pacing_ms() -> u64 {
    engine::ADVISORY_PACING.as_millis() as u64
}

fn default_max_packages() -> usize {
    engine::MAX_PACKAGES
}

fn default_dist_tag_concurrency() -> usize {
    engine::DIST_TAG_CONCURRENCY
}

fn default_metadata_concurrency() -> usize {
    engine::METADATA_CONCURRENCY
}

fn default_metadata_timeout_ms() -> u64 {
    engine::METADATA_TIMEOUT.as_millis() as u64
}

fn default_true() -> bool {
    true
}
