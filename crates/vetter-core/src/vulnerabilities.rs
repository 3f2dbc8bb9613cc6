//! Vulnerability resolution with a static fallback.
//!
//! Queries go to the advisory service in sequential, paced sub-batches.
//! A failed sub-batch yields "no advisories" for each of its items. When not
//! a single sub-batch succeeds, the whole lookup is answered from the
//! built-in table instead; a reachable service that simply reports nothing
//! never trips the fallback.

use crate::batch::with_deadline;
use crate::config::AnalyzerConfig;
use crate::fallback::known_advisories;
use crate::types::Dependency;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use vetter_info::{Advisory, AdvisorySource, Error as InfoError, PackageQuery};

/// Where the advisories of a lookup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryOrigin {
    /// The live advisory service answered at least one sub-batch.
    Live,
    /// The built-in table.
    Fallback,
}

/// Advisories per `name@version`.
#[derive(Debug, Clone)]
pub struct AdvisoryLookup {
    /// Advisories keyed by `name@version`.
    pub advisories: HashMap<String, Vec<Advisory>>,
    /// Source of the advisories.
    pub origin: AdvisoryOrigin,
}

impl AdvisoryLookup {
    /// Advisories for one dependency, empty when none are known.
    pub fn for_dependency(&self, dependency: &Dependency) -> &[Advisory] {
        self.advisories
            .get(&dependency.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the fallback table answered this lookup.
    pub fn used_fallback(&self) -> bool {
        self.origin == AdvisoryOrigin::Fallback
    }

    fn fallback(dependencies: &[Dependency]) -> Self {
        let advisories = dependencies
            .iter()
            .map(|dep| (dep.key(), known_advisories(&dep.name, &dep.version)))
            .collect();
        Self {
            advisories,
            origin: AdvisoryOrigin::Fallback,
        }
    }
}

/// Batch advisory resolver over an [`AdvisorySource`].
pub struct VulnerabilityResolver<'a, A> {
    source: &'a A,
    batch_size: usize,
    timeout: Duration,
    pacing: Duration,
    live: bool,
}

impl<'a, A: AdvisorySource> VulnerabilityResolver<'a, A> {
    /// Resolver using the advisory settings from `config`.
    pub fn new(source: &'a A, config: &AnalyzerConfig) -> Self {
        Self {
            source,
            batch_size: config.advisory_batch_size.max(1),
            timeout: config.advisory_timeout,
            pacing: config.advisory_pacing,
            live: config.live_advisories,
        }
    }

    /// Resolve advisories for every dependency.
    pub async fn resolve(&self, dependencies: &[Dependency]) -> AdvisoryLookup {
        if !self.live {
            debug!("live advisories disabled, using built-in table");
            return AdvisoryLookup::fallback(dependencies);
        }

        let mut advisories = HashMap::with_capacity(dependencies.len());
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        for (index, chunk) in dependencies.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            attempted += 1;

            match self.query_chunk(chunk).await {
                Ok(lists) => {
                    succeeded += 1;
                    for (dep, list) in chunk.iter().zip(lists) {
                        advisories.insert(dep.key(), list);
                    }
                }
                Err(e) => {
                    warn!(batch = index, size = chunk.len(), error = %e, "advisory sub-batch failed");
                    for dep in chunk {
                        advisories.insert(dep.key(), Vec::new());
                    }
                }
            }
        }

        if attempted > 0 && succeeded == 0 {
            warn!(
                batches = attempted,
                "advisory service unavailable, falling back to built-in advisories"
            );
            return AdvisoryLookup::fallback(dependencies);
        }

        info!(
            batches = attempted,
            succeeded,
            "advisory lookup complete"
        );
        AdvisoryLookup {
            advisories,
            origin: AdvisoryOrigin::Live,
        }
    }

    async fn query_chunk(&self, chunk: &[Dependency]) -> crate::Result<Vec<Vec<Advisory>>> {
        let queries: Vec<PackageQuery> = chunk
            .iter()
            .map(|dep| PackageQuery::new(dep.name.as_str(), dep.version.as_str()))
            .collect();

        let lists = with_deadline(
            "advisory batch query",
            self.timeout,
            self.source.query_batch(&queries),
        )
        .await?;

        if lists.len() != queries.len() {
            return Err(InfoError::MisalignedResponse {
                expected: queries.len(),
                actual: lists.len(),
            }
            .into());
        }
        Ok(lists)
    }
}
