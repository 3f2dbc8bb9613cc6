//! Source traits consumed by the analysis engine
//!
//! The engine only talks to external services through these traits, so the
//! HTTP clients in this crate can be swapped for in-memory fakes in tests.

use crate::types::{Advisory, PackageQuery, VersionMetadata};
use crate::Result;
use std::sync::Arc;

/// Package registry lookups
#[async_trait::async_trait]
pub trait RegistrySource: Send + Sync {
    /// Wait until the next lookup can be sent without queueing
    ///
    /// Sources that throttle themselves hold the admitted slot for the next
    /// lookup. Callers await this before starting a lookup deadline.
    async fn ready(&self) {}

    /// The `latest` dist-tag for a package, `None` if the tag is missing
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success response
    async fn latest_version(&self, name: &str) -> Result<Option<String>>;

    /// Normalized metadata for one published version
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success response
    async fn version_metadata(&self, name: &str, version: &str) -> Result<VersionMetadata>;
}

/// Batch vulnerability advisory lookups
#[async_trait::async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Advisories for each query, positionally aligned with `queries`
    ///
    /// # Errors
    /// Returns an error if the batch as a whole could not be answered
    async fn query_batch(&self, queries: &[PackageQuery]) -> Result<Vec<Vec<Advisory>>>;
}

#[async_trait::async_trait]
impl<T: RegistrySource + ?Sized> RegistrySource for Arc<T> {
    async fn ready(&self) {
        (**self).ready().await
    }

    async fn latest_version(&self, name: &str) -> Result<Option<String>> {
        (**self).latest_version(name).await
    }

    async fn version_metadata(&self, name: &str, version: &str) -> Result<VersionMetadata> {
        (**self).version_metadata(name, version).await
    }
}

#[async_trait::async_trait]
impl<T: AdvisorySource + ?Sized> AdvisorySource for Arc<T> {
    async fn query_batch(&self, queries: &[PackageQuery]) -> Result<Vec<Vec<Advisory>>> {
        (**self).query_batch(queries).await
    }
}
