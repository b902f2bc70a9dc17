use std::fs;

use tempfile::TempDir;
use viewstore::{ConfigError, StoreConfig};

/// Optimistic updates are on unless configured otherwise.
#[test]
fn test_config_default_values() {
    let config = StoreConfig::default();
    assert!(config.updates_state_immediately);
}

#[test]
fn test_load_missing_file_returns_default() {
    let dir = TempDir::new().expect("temp dir");
    let config = StoreConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, StoreConfig::default());
}

#[test]
fn test_load_reads_flag_from_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("store.toml");
    fs::write(&path, "updates_state_immediately = false\n").unwrap();

    let config = StoreConfig::load_from(&path).unwrap();
    assert!(!config.updates_state_immediately);
}

#[test]
fn test_load_empty_file_uses_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("store.toml");
    fs::write(&path, "").unwrap();

    assert_eq!(StoreConfig::load_from(&path).unwrap(), StoreConfig::default());
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("store.toml");
    fs::write(&path, "updates_state_immediately = \"sometimes\"\n").unwrap();

    let err = StoreConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("store.toml"));
}

#[test]
fn test_load_directory_is_read_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = StoreConfig::load_from(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn test_builder_overrides_flag() {
    let config = StoreConfig::default().with_updates_state_immediately(false);
    assert!(!config.updates_state_immediately);
}
