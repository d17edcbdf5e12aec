use maintsched::config::{Config, ConfigError};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.export_dir, PathBuf::from("."));
    assert!(config.advisory_seed.is_none());
    assert!(config.data_dir.ends_with("maintsched"));
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = Config::parse("log_level = \"debug\"\nadvisory_seed = 9\n").unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.advisory_seed, Some(9));
    assert_eq!(config.export_dir, Config::default().export_dir);
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "data_dir = \"/var/lib/maintsched\"\nexport_dir = \"/tmp/reports\"\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("/var/lib/maintsched"));
    assert_eq!(config.export_dir, PathBuf::from("/tmp/reports"));
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "advisory_seed = \"not a number\"").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}
