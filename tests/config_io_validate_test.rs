use apsema::config::Config;
use apsema::Credentials;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.credentials = Credentials::new("A", "S", "123", "456");
    cfg.poll_interval_secs = 30;
    cfg.timezone = "Europe/Amsterdam".to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.credentials, cfg.credentials);
    assert_eq!(loaded.poll_interval_secs, 30);
    assert_eq!(loaded.timezone, "Europe/Amsterdam");
    assert!(loaded.validate().is_ok());
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    cfg.credentials = Credentials::new("A", "S", "123", "456");
    assert!(cfg.validate().is_ok());

    cfg.credentials = Credentials::new("A", "", "123", "456");
    assert!(cfg.validate().is_err());

    cfg.credentials = Credentials::new("A", "S", "123", "456");
    cfg.api.timeout_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"credentials: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("Serialization error"));
}

#[test]
fn from_missing_file_is_io_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(tmp_dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}
