use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use vetter_config::{ConfigError, ConfigManager};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialize config file at ~/.vetter/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Validate config file
    Validate,
}

/// Run a config subcommand against `path`, or the default location.
pub fn handle_config_command(cmd: ConfigCommand, path: Option<PathBuf>) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        match cmd {
            ConfigCommand::Init { force } => init_config(path.as_deref(), force).await,
            ConfigCommand::Path => show_config_path(path.as_deref()),
            ConfigCommand::Show => show_config(path.as_deref()).await,
            ConfigCommand::Validate => validate_config(path.as_deref()).await,
        }
    })
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ConfigManager::config_path()?),
    }
}

async fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = resolve_path(path)?;

    match ConfigManager::init_at(&config_path, force).await {
        Ok(_) => {
            println!("✓ Initialized config at: {}", config_path.display());
            Ok(())
        }
        Err(ConfigError::ConfigExists(existing)) => {
            println!("Config already exists at: {}", existing.display());
            println!("To reinitialize, run 'vetter config init --force'.");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to initialize config"),
    }
}

fn show_config_path(path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;
    println!("{}", config_path.display());
    Ok(())
}

async fn show_config(path: Option<&Path>) -> Result<()> {
    let manager = ConfigManager::load_or_default(path)
        .await
        .context("Failed to load config")?;

    let rendered =
        toml::to_string_pretty(manager.config()).context("Failed to render config as TOML")?;
    print!("{}", rendered);
    Ok(())
}

async fn validate_config(path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;
    let manager = ConfigManager::load_from(&config_path)
        .await
        .context("Config not found or invalid. Run 'vetter config init' first.")?;

    manager.validate()?;

    let config = manager.config();
    println!("✓ Config is valid");
    println!("  Version: {}", config.version);
    println!("  Registry: {}", config.registry.url);
    println!(
        "  Advisories: {} ({})",
        config.advisories.url,
        if config.advisories.live { "live" } else { "offline" }
    );
    println!("  Max packages: {}", config.analysis.max_packages);

    Ok(())
}
