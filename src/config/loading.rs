//! Configuration loading.
//!
//! Resolves the configuration path, reads and parses the TOML file, applies
//! environment overrides and value modifications, then validates the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::constants::*;

/// Configuration directory from `--config`, set once at startup.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for this process. Only the first call wins.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// `porchlight.toml` in the custom directory, or under the XDG config directory.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        log_pipe!();
        log_error!("Configuration file not found:");
        log_indented!("{}", private_path(&config_path));
        log_block_start!("A minimal configuration looks like:");
        log_indented!("latitude = 59.4995");
        log_indented!("longitude = 18.0852");
        log_indented!("webhooks_key = \"...\"");
        anyhow::bail!("No configuration at {}", private_path(&config_path));
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", private_path(&config_path)))
}

/// Load configuration from a specific file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;
    apply_modifications(&mut config);

    Ok(config)
}

/// The environment wins over the file for the webhooks key.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(WEBHOOKS_KEY_ENV)
        && !key.trim().is_empty()
    {
        config.webhooks_key = Some(key);
    }
}

/// Adjust values that are valid but unusable as written.
fn apply_modifications(config: &mut Config) {
    if let Some(lat) = config.latitude
        && lat.abs() > MAXIMUM_SOLAR_LATITUDE
    {
        log_pipe!();
        log_warning!(
            "Latitude capped at {MAXIMUM_SOLAR_LATITUDE}°{} (config {:.4}°{})",
            if lat >= 0.0 { "N" } else { "S" },
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" }
        );
        log_indented!("Sunrise and sunset are undefined during polar day and night.");
        config.latitude = Some(MAXIMUM_SOLAR_LATITUDE * lat.signum());
    }
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
