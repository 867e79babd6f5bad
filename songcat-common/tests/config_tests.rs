//! Configuration resolution tests
//!
//! Priority: CLI overrides > environment > TOML file > built-in defaults.
//! A missing TOML file is not an error.
//!
//! Tests that touch SONGCAT_* variables are marked #[serial] so they never
//! run in parallel with each other.

use serial_test::serial;
use songcat_common::config::{
    load_toml_config, ConfigOverrides, IngestConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONNECTIONS,
    ENV_BATCH_SIZE, ENV_DATABASE_PATH, ENV_LOG_LEVEL,
};
use songcat_common::Error;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_DATABASE_PATH);
    env::remove_var(ENV_BATCH_SIZE);
    env::remove_var(ENV_LOG_LEVEL);
}

fn write_toml(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("songcat-ingest.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_missing_toml_uses_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config =
        IngestConfig::resolve(&dir.path().join("absent.toml"), ConfigOverrides::default()).unwrap();

    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    assert_eq!(config.log_level, "info");
    assert!(config.database_path.ends_with("catalog.db"));
}

#[test]
#[serial]
fn test_toml_values_applied() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_toml(
        &dir,
        r#"
        database_path = "/data/catalog.db"

        [ingest]
        batch_size = 500
        max_connections = 2

        [logging]
        level = "debug"
        "#,
    );

    let config = IngestConfig::resolve(&path, ConfigOverrides::default()).unwrap();

    assert_eq!(config.database_path, PathBuf::from("/data/catalog.db"));
    assert_eq!(config.batch_size, 500);
    assert_eq!(config.max_connections, 2);
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_toml(
        &dir,
        r#"
        database_path = "/data/catalog.db"

        [ingest]
        batch_size = 500
        "#,
    );

    env::set_var(ENV_DATABASE_PATH, "/env/catalog.db");
    env::set_var(ENV_BATCH_SIZE, "64");
    env::set_var(ENV_LOG_LEVEL, "warn");

    let config = IngestConfig::resolve(&path, ConfigOverrides::default()).unwrap();
    clear_env();

    assert_eq!(config.database_path, PathBuf::from("/env/catalog.db"));
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.log_level, "warn");
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(ENV_BATCH_SIZE, "64");
    env::set_var(ENV_DATABASE_PATH, "/env/catalog.db");

    let overrides = ConfigOverrides {
        database_path: Some(PathBuf::from("/cli/catalog.db")),
        batch_size: Some(10),
        log_level: Some("trace".to_string()),
    };
    let config = IngestConfig::resolve(&dir.path().join("absent.toml"), overrides).unwrap();
    clear_env();

    assert_eq!(config.database_path, PathBuf::from("/cli/catalog.db"));
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.log_level, "trace");
}

#[test]
#[serial]
fn test_blank_env_value_ignored() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(ENV_BATCH_SIZE, "  ");

    let config =
        IngestConfig::resolve(&dir.path().join("absent.toml"), ConfigOverrides::default()).unwrap();
    clear_env();

    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
}

#[test]
#[serial]
fn test_invalid_env_value_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(ENV_BATCH_SIZE, "lots");

    let result = IngestConfig::resolve(&dir.path().join("absent.toml"), ConfigOverrides::default());
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_zero_batch_size_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let overrides = ConfigOverrides {
        batch_size: Some(0),
        ..Default::default()
    };

    let result = IngestConfig::resolve(&dir.path().join("absent.toml"), overrides);

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(&dir, "[ingest\nbatch_size = ");

    let result = load_toml_config(&path);

    assert!(matches!(result, Err(Error::Config(_))));
}
