//! npm registry client

use crate::cache::RegistryCache;
use crate::client::{ClientOptions, HttpClient};
use crate::error::{Error, Result};
use crate::traits::RegistrySource;
use crate::types::{InstallHook, LicenseField, VersionMetadata, UNKNOWN_LICENSE};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Public npm registry
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default timeout for a single registry lookup
pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// `GET /-/package/{name}/dist-tags` response
#[derive(Debug, Deserialize)]
struct DistTags {
    latest: Option<String>,
}

/// `GET /{name}/{version}` response, only the fields we keep
#[derive(Debug, Deserialize)]
struct NpmVersionManifest {
    #[serde(default)]
    license: Option<LicenseField>,
    #[serde(default)]
    licenses: Option<LicenseField>,
    #[serde(default)]
    deprecated: Option<serde_json::Value>,
    #[serde(default)]
    scripts: Option<serde_json::Value>,
}

impl NpmVersionManifest {
    fn into_metadata(self) -> VersionMetadata {
        let license = self
            .license
            .as_ref()
            .and_then(LicenseField::normalize)
            .or_else(|| self.licenses.as_ref().and_then(LicenseField::normalize))
            .unwrap_or_else(|| UNKNOWN_LICENSE.to_string());

        let deprecated = match &self.deprecated {
            Some(serde_json::Value::String(message)) => !message.trim().is_empty(),
            Some(serde_json::Value::Bool(flag)) => *flag,
            _ => false,
        };

        let install_hooks = match self.scripts.as_ref().and_then(|s| s.as_object()) {
            Some(scripts) => InstallHook::ALL
                .into_iter()
                .filter(|hook| scripts.contains_key(hook.as_str()))
                .collect(),
            None => Vec::new(),
        };

        VersionMetadata {
            license,
            deprecated,
            install_hooks,
        }
    }
}

/// Client for the npm registry
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
    cache: Option<Arc<RegistryCache>>,
}

impl NpmRegistry {
    /// Client for the public registry with the default 5s lookup timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = HttpClient::with_options(&ClientOptions::with_timeout(REGISTRY_TIMEOUT))?;
        Self::with_client(client, NPM_REGISTRY_URL)
    }

    /// Client for an arbitrary registry (mirrors, test servers)
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
            cache: None,
        })
    }

    /// Share a version metadata cache with this client
    ///
    /// Useful when the same process runs many analyses; see [`RegistryCache`].
    pub fn with_cache(mut self, cache: Arc<RegistryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The attached cache, if any
    pub fn cache(&self) -> Option<&Arc<RegistryCache>> {
        self.cache.as_ref()
    }

    fn dist_tags_url(&self, name: &str) -> String {
        format!("{}/-/package/{}/dist-tags", self.base_url, encode_name(name))
    }

    fn version_url(&self, name: &str, version: &str) -> String {
        format!("{}/{}/{}", self.base_url, encode_name(name), version)
    }
}

/// Encode package name for URL (handle scoped packages like @scope/name)
fn encode_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replace('/', "%2F")
    } else {
        name.to_string()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidPackageName(
            "Package name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl RegistrySource for NpmRegistry {
    async fn ready(&self) {
        self.client.reserve().await;
    }

    async fn latest_version(&self, name: &str) -> Result<Option<String>> {
        validate_name(name)?;

        let tags: DistTags = self.client.get_json(&self.dist_tags_url(name)).await?;
        Ok(tags.latest.filter(|v| !v.is_empty()))
    }

    async fn version_metadata(&self, name: &str, version: &str) -> Result<VersionMetadata> {
        validate_name(name)?;

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(name, version)) {
            debug!(package = name, version, "version metadata served from cache");
            return Ok(cached);
        }

        let manifest: NpmVersionManifest =
            self.client.get_json(&self.version_url(name, version)).await?;
        let metadata = manifest.into_metadata();

        if let Some(cache) = &self.cache {
            cache.insert(name, version, metadata.clone());
        }

        Ok(metadata)
    }
}
