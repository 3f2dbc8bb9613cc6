use crate::types::VetterConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("URL for {field} must use http or https, got {scheme}")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("User agent contains invalid characters")]
    InvalidUserAgent,
}

/// Validate a service base URL
///
/// Only absolute http(s) URLs are accepted.
pub fn validate_service_url(field: &'static str, raw: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::UnsupportedScheme {
            field,
            scheme: other.to_string(),
        }),
    }
}

fn require_positive(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(())
}

/// Check every value in a loaded config
pub fn validate_config(config: &VetterConfig) -> Result<(), ValidationError> {
    validate_service_url("registry.url", &config.registry.url)?;
    validate_service_url("advisories.url", &config.advisories.url)?;

    if let Some(rps) = config.registry.requests_per_second {
        require_positive("registry.requests_per_second", u64::from(rps))?;
    }
    if let Some(agent) = &config.registry.user_agent {
        if agent.is_empty() || agent.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidUserAgent);
        }
    }

    require_positive("advisories.batch_size", config.advisories.batch_size as u64)?;
    require_positive("advisories.timeout_ms", config.advisories.timeout_ms)?;
    require_positive("analysis.max_packages", config.analysis.max_packages as u64)?;
    require_positive(
        "analysis.dist_tag_concurrency",
        config.analysis.dist_tag_concurrency as u64,
    )?;
    require_positive(
        "analysis.metadata_concurrency",
        config.analysis.metadata_concurrency as u64,
    )?;
    require_positive("analysis.metadata_timeout_ms", config.analysis.metadata_timeout_ms)?;

    Ok(())
}

/// Set restrictive permissions on config file (Unix only)
#[cfg(unix)]
pub fn set_config_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600); // rw------- (user read/write only)
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Set config permissions (no-op on Windows for now)
#[cfg(not(unix))]
pub fn set_config_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
