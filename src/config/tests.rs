//! Tests for config functionality.

use crate::config::{Config, DEFAULT_MANIFEST_NAME};
use crate::error::Error;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.root, None);
    assert_eq!(config.dir_mode, 0o700);
    assert_eq!(config.file_mode, 0o600);
    assert_eq!(config.manifest_name, DEFAULT_MANIFEST_NAME);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_empty_yaml_uses_defaults() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    // Modes are plain decimal integers in YAML (493 == 0o755).
    let yaml = r#"
root: /var/tmp/shared
dir_mode: 493
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.root, Some(PathBuf::from("/var/tmp/shared")));
    assert_eq!(config.dir_mode, 0o755);
    assert_eq!(config.file_mode, 0o600);
    assert_eq!(config.manifest_name, "manifest.json");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
manifest_name: ready.json
some_future_setting: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.manifest_name, "ready.json");
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = Config::from_yaml("dir_mode: [not, a, number]").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_mode_out_of_range_is_rejected() {
    let err = Config::from_yaml("file_mode: 4095").unwrap_err();
    assert!(err.to_string().contains("file_mode"));
}

#[test]
fn test_manifest_name_must_be_a_component() {
    let err = Config::from_yaml("manifest_name: nested/manifest.json").unwrap_err();
    assert!(err.to_string().contains("manifest_name"));

    let err = Config::from_yaml("manifest_name: ..").unwrap_err();
    assert!(err.to_string().contains("manifest_name"));
}

#[test]
fn test_manifest_name_cannot_shadow_lock_file() {
    let err = Config::from_yaml("manifest_name: .lock").unwrap_err();
    assert!(err.to_string().contains(".lock"));
}

#[test]
fn test_manifest_name_cannot_shadow_data_dir() {
    let err = Config::from_yaml("manifest_name: data").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("'data'"));

    let config = Config::from_yaml("manifest_name: data.json").unwrap();
    assert_eq!(config.manifest_name, "data.json");
}

#[test]
fn test_yaml_roundtrip() {
    let config = Config {
        root: Some(PathBuf::from("/srv/refshare")),
        dir_mode: 0o750,
        file_mode: 0o640,
        manifest_name: "done.json".to_string(),
    };

    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("refshare.yaml");
    std::fs::write(&path, "manifest_name: ok.json\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.manifest_name, "ok.json");
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(temp_dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_root_dir_defaults_to_temp() {
    let config = Config::default();
    assert_eq!(
        config.root_dir(),
        std::env::temp_dir().join("refshare")
    );

    let config = Config {
        root: Some(PathBuf::from("/srv/x")),
        ..Config::default()
    };
    assert_eq!(config.root_dir(), PathBuf::from("/srv/x"));
}

#[test]
fn test_permissions_follow_config() {
    let config = Config {
        dir_mode: 0o755,
        file_mode: 0o644,
        ..Config::default()
    };
    let perms = config.permissions();
    assert_eq!(perms.dir_mode, 0o755);
    assert_eq!(perms.file_mode, 0o644);
}
