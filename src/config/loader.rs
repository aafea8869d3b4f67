use crate::config::schema::Config;
use crate::providers::ProviderSettings;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
static CONFIG_TEST_ENV_LOCK: Mutex<()> = Mutex::new(());

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Loads configuration: defaults, then the config file, then environment
///
/// Per-run CLI overrides are applied later through `RunParameters`.
pub fn load_config(cli_config_path: Option<PathBuf>) -> Result<Config> {
    tracing::debug!("Loading configuration");

    let mut config = Config::default();

    // Layer 1: config file (~/.scoutclaw/config.json)
    let config_file = cli_config_path.clone().or_else(get_config_path);

    if let Some(ref path) = config_file {
        if path.exists() {
            tracing::debug!(config_path = %path.display(), "Loading configuration from file");
            config = merge_config_from_file(config, path)?;
        } else {
            tracing::debug!(config_path = %path.display(), "Config file not found, using defaults");
        }
    }

    // Layer 2: environment variables
    tracing::debug!("Applying environment variable overrides");
    config = merge_env_variables(config);

    let summary = config.get_safe_summary();
    tracing::debug!(
        api_key_configured = summary.api_key_configured,
        base_url = %summary.base_url,
        model = ?summary.model,
        fallback_configured = summary.fallback_configured,
        search_configured = summary.search_configured,
        max_iterations = summary.max_iterations,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Default config file location, `~/.scoutclaw/config.json`
pub fn get_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".scoutclaw").join("config.json"))
}

fn merge_config_from_file(config: Config, path: &Path) -> Result<Config> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config),
        Err(e) => return Err(e).context("Failed to read metadata for config file"),
    };

    let mode = metadata.permissions().mode() & 0o777;

    if mode != 0o600 {
        tracing::error!(
            "Config file {:?} has permissions {:o}, expected 0600 - skipping for security",
            path,
            mode
        );
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let file_config: Config = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;

    Ok(file_config)
}

/// Reads a non-empty environment variable
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn merge_env_variables(mut config: Config) -> Config {
    if let Some(key) = env_value("OPENAI_API_KEY") {
        config.provider.api_key = key;
    }
    if let Some(url) = env_value("OPENAI_BASE_URL") {
        config.provider.base_url = url;
    }
    if let Some(model) = env_value("OPENAI_MODEL") {
        config.provider.model = Some(model);
    }

    let fallback_key = env_value("FALLBACK_API_KEY");
    let fallback_url = env_value("FALLBACK_BASE_URL");
    let fallback_model = env_value("FALLBACK_MODEL");

    if fallback_key.is_some() || fallback_url.is_some() || fallback_model.is_some() {
        let mut fallback = config.fallback.take().unwrap_or_else(|| ProviderSettings::new(""));
        if let Some(key) = fallback_key {
            fallback.api_key = key;
        }
        if let Some(url) = fallback_url {
            fallback.base_url = url;
        }
        if let Some(model) = fallback_model {
            fallback.model = Some(model);
        }
        config.fallback = Some(fallback);
    }

    if let Some(key) = env_value("GOOGLE_SEARCH_API_KEY") {
        config.search.api_key = key;
    }
    if let Some(cx) = env_value("GOOGLE_SEARCH_ENGINE_ID") {
        config.search.engine_id = cx;
    }
    if let Some(proxy) = env_value("FETCH_PROXY_URL") {
        config.fetch.proxy_url = proxy;
    }

    config
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(config)?;

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create config file: {:?}", path))?;

    file.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    // Owner read/write only
    let mut permissions = file.metadata()?.permissions();
    permissions.set_mode(0o600);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to set permissions on config file: {:?}", path))?;

    tracing::info!("Configuration saved to {:?}", path);
    Ok(())
}
