use super::*;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = StudyConfig::default_config().unwrap();

    assert_eq!(config.api.base_url, "http://localhost:5000");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.remote.kind, RemoteKind::File);
    assert!(config.remote.root.is_none());
    assert_eq!(config.chat.history_limit, 10);
    assert_eq!(config.upload.max_file_bytes, 10 * 1024 * 1024);
    assert_eq!(config.upload.accepted_extensions, vec![".txt", ".pdf"]);
}

#[test]
fn test_default_config_validates() {
    let config = StudyConfig::default_config().unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing_with_defaults() {
    let yaml = r#"
api:
  base_url: "http://summarizer.internal:8080"
remote:
  kind: memory
"#;
    let config: StudyConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.base_url, "http://summarizer.internal:8080");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.remote.kind, RemoteKind::Memory);
    assert_eq!(config.chat.history_limit, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_base_url() {
    let mut config = StudyConfig::default_config().unwrap();
    config.api.base_url = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("base_url"));
}

#[test]
fn test_validate_rejects_zero_limits() {
    let mut config = StudyConfig::default_config().unwrap();
    config.chat.history_limit = 0;
    assert!(config.validate().is_err());

    let mut config = StudyConfig::default_config().unwrap();
    config.upload.max_file_bytes = 0;
    assert!(config.validate().is_err());

    let mut config = StudyConfig::default_config().unwrap();
    config.api.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_extensions() {
    let mut config = StudyConfig::default_config().unwrap();
    config.upload.accepted_extensions = Vec::new();
    assert!(config.validate().is_err());

    config.upload.accepted_extensions = vec!["txt".to_string()];
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("must start with a dot"));
}

#[test]
fn test_resolve_prefers_explicit_then_user_file() {
    let temp_dir = TempDir::new().unwrap();
    let user_config = temp_dir.path().join("config.yaml");

    // No user file: embedded defaults
    let config = StudyConfig::resolve(None, &user_config).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:5000");

    std::fs::write(&user_config, "api:\n  base_url: \"http://user:1\"\n").unwrap();
    let config = StudyConfig::resolve(None, &user_config).unwrap();
    assert_eq!(config.api.base_url, "http://user:1");

    let explicit = temp_dir.path().join("explicit.yaml");
    std::fs::write(&explicit, "api:\n  base_url: \"http://explicit:2\"\n").unwrap();
    let config = StudyConfig::resolve(Some(&explicit), &user_config).unwrap();
    assert_eq!(config.api.base_url, "http://explicit:2");
}

#[test]
fn test_load_reports_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.yaml");
    std::fs::write(&path, "api:\n  base_url: \"\"\n").unwrap();
    assert!(StudyConfig::load(&path).is_err());

    let missing = temp_dir.path().join("missing.yaml");
    let err = StudyConfig::load(&missing).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
