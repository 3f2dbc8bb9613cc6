pub mod manager;
pub mod security;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use security::{validate_config, validate_service_url, ValidationError};
pub use types::{AdvisorySettings, AnalysisSettings, RegistrySettings, VetterConfig};
