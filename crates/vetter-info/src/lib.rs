//! Registry metadata and vulnerability advisory clients for vetter
//!
//! This library provides the external-service side of a dependency risk
//! analysis: npm registry lookups (dist-tags and per-version manifests) and
//! batch advisory queries against the OSV API.
//!
//! Both clients implement the source traits ([`RegistrySource`],
//! [`AdvisorySource`]) that the analysis engine consumes.
//!
//! # Example
//!
//! ```no_run
//! use vetter_info::{AdvisorySource, NpmRegistry, OsvClient, PackageQuery, RegistrySource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = NpmRegistry::new()?;
//!     let latest = registry.latest_version("react").await?;
//!     println!("react latest: {:?}", latest);
//!
//!     let meta = registry.version_metadata("esbuild", "0.19.0").await?;
//!     println!("license {} hooks {:?}", meta.license, meta.install_hooks);
//!
//!     let osv = OsvClient::new()?;
//!     let advisories = osv
//!         .query_batch(&[PackageQuery::new("minimist", "1.2.5")])
//!         .await?;
//!     println!("{} advisories", advisories[0].len());
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod client;
mod error;
mod npm;
mod osv;
mod traits;
mod types;

pub use cache::{CacheStats, RegistryCache};
pub use client::{ClientOptions, HttpClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use npm::{NpmRegistry, NPM_REGISTRY_URL, REGISTRY_TIMEOUT};
pub use osv::{classify_severity, OsvClient, ADVISORY_TIMEOUT, NPM_ECOSYSTEM, OSV_API_URL};
pub use traits::{AdvisorySource, RegistrySource};
pub use types::{
    Advisory, InstallHook, LicenseField, PackageQuery, Severity, VersionMetadata, UNKNOWN_LICENSE,
};
