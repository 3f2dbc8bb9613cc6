//! Detector pipeline
//!
//! Each detector inspects one enriched dependency and returns zero or more
//! issues. The pipeline runs them in a fixed order, and that order is the
//! order issues appear in a [`DependencyResult`](crate::DependencyResult):
//!
//! 1. metadata failure
//! 2. deprecated
//! 3. install scripts
//! 4. license conflict
//! 5. vulnerabilities
//! 6. typosquat
//! 7. safe update

mod license;
mod registry;
mod typosquat;
mod update;
mod vulnerability;

pub use license::LicenseDetector;
pub use registry::{DeprecatedDetector, InstallScriptsDetector, MetadataFailureDetector};
pub use typosquat::{levenshtein, TyposquatDetector, POPULAR_PACKAGES};
pub use update::UpdateDetector;
pub use vulnerability::VulnerabilityDetector;

use crate::types::{Dependency, EnrichedInfo, Issue};
use vetter_info::Advisory;

/// Everything a detector may look at for one dependency.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    /// The dependency under inspection.
    pub dependency: &'a Dependency,
    /// Its registry metadata.
    pub info: &'a EnrichedInfo,
    /// The package's `latest` dist-tag, if resolved.
    pub latest_version: Option<&'a str>,
    /// Advisories affecting this exact version.
    pub advisories: &'a [Advisory],
    /// License of the analyzed project.
    pub project_license: Option<&'a str>,
}

/// A single risk check.
pub trait Detector: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Issues found for this dependency, possibly none.
    fn inspect(&self, ctx: &DetectionContext<'_>) -> Vec<Issue>;
}

/// Ordered set of detectors.
pub struct DetectorPipeline {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorPipeline {
    /// The standard pipeline, in output order.
    pub fn standard() -> Self {
        Self {
            detectors: vec![
                Box::new(MetadataFailureDetector),
                Box::new(DeprecatedDetector),
                Box::new(InstallScriptsDetector),
                Box::new(LicenseDetector),
                Box::new(VulnerabilityDetector),
                Box::new(TyposquatDetector),
                Box::new(UpdateDetector),
            ],
        }
    }

    /// Pipeline from an explicit detector list.
    pub fn from_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Detector names in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run every detector and concatenate their issues.
    pub fn run(&self, ctx: &DetectionContext<'_>) -> Vec<Issue> {
        self.detectors
            .iter()
            .flat_map(|detector| detector.inspect(ctx))
            .collect()
    }
}

impl Default for DetectorPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for DetectorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorPipeline")
            .field("detectors", &self.names())
            .finish()
    }
}
