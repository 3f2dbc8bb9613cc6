use crate::formatters::{formatter_for, OutputFormat};
use crate::input::load_request;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing::warn;
use vetter_config::{ConfigError, ConfigManager, VetterConfig};
use vetter_core::{Analyzer, CancellationToken, Error as AnalysisError};
use vetter_info::{HttpClient, NpmRegistry, OsvClient};

/// Exit status when the run is interrupted.
const EXIT_INTERRUPTED: u8 = 130;

/// Options for one `vetter analyze` run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub license: Option<String>,
    pub format: OutputFormat,
    pub fixes_only: bool,
    pub offline_advisories: bool,
}

pub fn run_analyze(options: &AnalyzeOptions) -> Result<ExitCode> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(analyze(options))
}

async fn analyze(options: &AnalyzeOptions) -> Result<ExitCode> {
    let config = load_config(options.config.as_deref()).await?;
    let mut request = load_request(options.input.as_deref())?;

    // --license beats the input document, which beats the config file
    request.project_license = options
        .license
        .clone()
        .or(request.project_license)
        .or_else(|| config.analysis.project_license.clone());

    let registry_client = HttpClient::with_options(&config.registry_client_options())
        .context("Failed to build registry client")?;
    let registry = NpmRegistry::with_client(registry_client, config.registry.url.clone())
        .context("Invalid registry URL")?;

    let advisory_client = HttpClient::with_options(&config.advisory_client_options())
        .context("Failed to build advisory client")?;
    let advisories = OsvClient::with_client(advisory_client, config.advisories.url.clone())
        .context("Invalid advisory URL")?;

    let mut engine_config = config.to_analyzer_config();
    if options.offline_advisories {
        engine_config.live_advisories = false;
    }
    let analyzer = Analyzer::new(registry, advisories).with_config(engine_config);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let report = match analyzer.analyze_with_cancellation(request, &token).await {
        Ok(report) => report,
        Err(AnalysisError::Cancelled) => {
            eprintln!("Interrupted");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
        Err(e) => return Err(e).context("Analysis failed"),
    };

    if options.fixes_only {
        println!("{}", report.fixes_joined());
    } else {
        let output = formatter_for(options.format).format(&report)?;
        println!("{}", output);
    }

    Ok(ExitCode::SUCCESS)
}

async fn load_config(path: Option<&Path>) -> Result<VetterConfig> {
    let config = match ConfigManager::load_or_default(path).await {
        Ok(manager) => manager.config().clone(),
        // No home directory and no explicit path: run on built-in defaults
        Err(ConfigError::HomeNotFound) if path.is_none() => {
            warn!("home directory not found, using default configuration");
            VetterConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| match path {
                Some(path) => format!("Failed to load config from {}", path.display()),
                None => "Failed to load config".to_string(),
            })
        }
    };

    vetter_config::validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}
