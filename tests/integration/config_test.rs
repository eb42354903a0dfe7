use sysmon::core::system_monitor::AlertConfig;
use sysmon::Config;
use sysmon::RetentionStore;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.sample_interval_secs, 60);
    assert_eq!(config.resource_retention_hours, 24);
    assert_eq!(config.process_retention_minutes, 60);
    assert_eq!(config.alerts, AlertConfig::default());
}

#[test]
fn test_load_missing_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.json");

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.sample_interval_secs = 5;
    config.leak.threshold_mb = 250.0;
    config.alerts.enabled = false;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_corrupted_file_falls_back_to_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, b"\n").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_retention_policy_from_config() {
    let config = Config {
        resource_retention_hours: 2,
        process_retention_minutes: 15,
        ..Default::default()
    };
    let policy = config.retention_policy();
    assert_eq!(policy.resource_window, chrono::Duration::hours(2));
    assert_eq!(policy.process_window, chrono::Duration::minutes(15));
}

#[test]
fn test_oversized_retention_is_clamped() {
    let config: Config = serde_json::from_str(
        r#"{ "resource_retention_hours": 1000000000000, "process_retention_minutes": -5 }"#,
    )
    .unwrap();

    let policy = config.retention_policy();
    assert_eq!(policy.resource_window, chrono::Duration::hours(366 * 24));
    assert_eq!(policy.process_window, chrono::Duration::minutes(1));

    let store = RetentionStore::with_policy(policy);
    let stats = store.prune(chrono::Utc::now());
    assert_eq!(stats.resource_samples, 0);
}
