use std::fs;

use hiresdl::config::{Config, ConfigError, Language};
use tempfile::TempDir;

#[tokio::test]
async fn test_load_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "email": "listener@example.com",
            "password": "secret",
            "outPath": "/music/hra",
            "trackTemplate": "{{.track}} - {{.title}}",
            "downloadBooklets": true,
            "language": "de"
        }"#,
    )
    .unwrap();

    let config = Config::load(Some(path)).await.unwrap();
    assert_eq!(config.email, "listener@example.com");
    assert_eq!(config.track_template, "{{.track}} - {{.title}}");
    assert!(config.download_booklets);
    assert!(!config.max_cover_size);
    assert_eq!(config.language, Language::De);
}

#[tokio::test]
async fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");

    let result = Config::load(Some(path.clone())).await;
    assert!(matches!(result, Err(ConfigError::IoError(p, _)) if p == path));
}

#[tokio::test]
async fn test_load_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ email: ").unwrap();

    assert!(matches!(
        Config::load(Some(path)).await,
        Err(ConfigError::SerdeError(_))
    ));
}

#[test]
fn test_example_config_parses() {
    let json = include_str!("../config.example.json");
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.track_template, "{{.trackPad}}. {{.title}}");
    assert!(config.keep_cover);
}
