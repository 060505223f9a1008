//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and the
//! environment.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use clinicflow_domain::ClinicError;
use clinicflow_infra::config;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn config_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        ".json",
        r#"{
            "api": {
                "base_url": "https://clinic.example/api",
                "timeout_ms": 10000,
                "health_timeout_ms": 2000,
                "login_path": "/auth/login"
            },
            "retry": { "retries": 2, "retry_delay_ms": 500 },
            "cache": { "default_ttl_ms": 120000, "max_entries": 500 },
            "logging": { "level": "debug", "json": true }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.base_url, "https://clinic.example/api");
    assert_eq!(config.api.timeout, Duration::from_secs(10));
    assert_eq!(config.api.health_timeout, Duration::from_secs(2));
    assert_eq!(config.api.login_path, "/auth/login");
    assert_eq!(config.retry.retries, 2);
    assert_eq!(config.retry.retry_delay, Duration::from_millis(500));
    assert_eq!(config.cache.default_ttl, Duration::from_secs(120));
    assert_eq!(config.cache.max_entries, Some(500));
    assert!(config.logging.json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_toml_file() {
    let file = config_file(
        ".toml",
        r#"
[api]
base_url = "http://localhost:4000"

[logging]
level = "warn"
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.api.base_url, "http://localhost:4000");
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.retry.retries, 3);
    assert_eq!(config.api.health_timeout, Duration::from_secs(5));
}

#[test]
fn test_invalid_values_fail_validation() {
    let file = config_file(".json", r#"{ "api": { "base_url": "ftp://clinic.example" } }"#);

    let config = config::load_from_file(Some(file.path().to_path_buf())).unwrap();
    assert!(matches!(config.validate(), Err(ClinicError::Config(_))));
}

#[test]
fn test_load_prefers_environment() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    std::env::set_var("CLINICFLOW_API_BASE_URL", "https://env.clinic.example");
    std::env::set_var("CLINICFLOW_RETRIES", "0");

    let result = config::load();

    std::env::remove_var("CLINICFLOW_API_BASE_URL");
    std::env::remove_var("CLINICFLOW_RETRIES");

    let config = result.expect("env config should load");
    assert_eq!(config.api.base_url, "https://env.clinic.example");
    assert_eq!(config.retry.retries, 0);
}

#[test]
fn test_load_rejects_invalid_env_base_url() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    std::env::set_var("CLINICFLOW_API_BASE_URL", "not a url");

    let result = config::load();

    std::env::remove_var("CLINICFLOW_API_BASE_URL");
    assert!(matches!(result, Err(ClinicError::Config(_))));
}
