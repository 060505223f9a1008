//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file from the working directory if one exists
//! 2. Attempts to load from environment variables
//! 3. If `CLINICFLOW_API_BASE_URL` is missing, falls back to a config file
//! 4. Searches multiple paths for config files (JSON or TOML)
//! 5. Validates the result
//!
//! ## Environment Variables
//! - `CLINICFLOW_API_BASE_URL`: API base URL (required)
//! - `CLINICFLOW_API_TIMEOUT_MS`: Request timeout in milliseconds
//! - `CLINICFLOW_RETRIES`: Default retry count
//! - `CLINICFLOW_RETRY_DELAY_MS`: Initial backoff delay in milliseconds
//! - `CLINICFLOW_CACHE_TTL_MS`: Default cache TTL in milliseconds
//! - `CLINICFLOW_CACHE_MAX_ENTRIES`: Cache capacity
//! - `CLINICFLOW_LOG_LEVEL`: `tracing` filter directive
//! - `CLINICFLOW_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./clinicflow.json` or `./clinicflow.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clinicflow_domain::{ClientConfig, ClinicError, Result};

const ENV_BASE_URL: &str = "CLINICFLOW_API_BASE_URL";
const ENV_TIMEOUT_MS: &str = "CLINICFLOW_API_TIMEOUT_MS";
const ENV_RETRIES: &str = "CLINICFLOW_RETRIES";
const ENV_RETRY_DELAY_MS: &str = "CLINICFLOW_RETRY_DELAY_MS";
const ENV_CACHE_TTL_MS: &str = "CLINICFLOW_CACHE_TTL_MS";
const ENV_CACHE_MAX_ENTRIES: &str = "CLINICFLOW_CACHE_MAX_ENTRIES";
const ENV_LOG_LEVEL: &str = "CLINICFLOW_LOG_LEVEL";
const ENV_LOG_JSON: &str = "CLINICFLOW_LOG_JSON";

/// Load configuration with automatic fallback strategy
///
/// Reads `.env` first, then environment variables. If the base URL is not
/// set in the environment, falls back to loading from a config file.
///
/// # Errors
/// Returns `ClinicError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only the base URL is required; every other variable overrides the
/// corresponding default.
///
/// # Errors
/// Returns `ClinicError::Config` if the base URL is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    config.api.base_url = env_var(ENV_BASE_URL)?;

    if let Some(ms) = env_parse::<u64>(ENV_TIMEOUT_MS, "request timeout")? {
        config.api.timeout = Duration::from_millis(ms);
    }
    if let Some(retries) = env_parse::<u32>(ENV_RETRIES, "retry count")? {
        config.retry.retries = retries;
    }
    if let Some(ms) = env_parse::<u64>(ENV_RETRY_DELAY_MS, "retry delay")? {
        config.retry.retry_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = env_parse::<u64>(ENV_CACHE_TTL_MS, "cache TTL")? {
        config.cache.default_ttl = Duration::from_millis(ms);
    }
    if let Some(max) = env_parse::<usize>(ENV_CACHE_MAX_ENTRIES, "cache max entries")? {
        config.cache.max_entries = Some(max);
    }
    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ClinicError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClinicError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ClinicError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClinicError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClinicError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClinicError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ClinicError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_paths(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_paths(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_paths(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("clinicflow.json"),
        dir.join("clinicflow.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `ClinicError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ClinicError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `ClinicError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ClinicError::Config(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
