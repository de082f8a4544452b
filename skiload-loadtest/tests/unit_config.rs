use skiload_common::SkiLoadError;
use skiload_loadtest::config::{ConfigOverrides, RunConfig, DEFAULT_RESORT_ID, DEFAULT_SERVER_ADDRESS};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn invalid_message(config: &RunConfig) -> String {
    match config.validate() {
        Err(SkiLoadError::InvalidConfig(msg)) => msg,
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn test_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.max_threads, 256);
    assert_eq!(config.num_skiers, 50_000);
    assert_eq!(config.num_lifts, 40);
    assert_eq!(config.ski_day, 1);
    assert_eq!(config.resort_id, DEFAULT_RESORT_ID);
    assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(config.timeout_secs, 120);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = RunConfig::from_toml(
        r#"
        max_threads = 32
        server_address = "http://10.0.0.5:8080/skiers-api"

        [phases.cooldown]
        time_start = 361
        time_end = 420
        post_count = 50
        get1_count = 2
        get2_count = 2
        "#,
    )
    .unwrap();

    assert_eq!(config.max_threads, 32);
    assert_eq!(config.server_address, "http://10.0.0.5:8080/skiers-api");
    assert_eq!(config.num_skiers, 50_000);
    assert_eq!(config.phases.cooldown.post_count, 50);
    assert_eq!(config.phases.startup.post_count, 1000);
}

#[test]
fn test_bad_toml_is_invalid_config() {
    let result = RunConfig::from_toml("max_threads = \"many\"");
    assert!(matches!(result, Err(SkiLoadError::InvalidConfig(_))));
}

#[test]
fn test_thread_bounds() {
    let mut config = RunConfig { max_threads: 3, ..RunConfig::default() };
    assert_eq!(invalid_message(&config), "max_threads must be in 4..=256, got 3");

    config.max_threads = 257;
    assert!(config.validate().is_err());

    config.max_threads = 4;
    assert!(config.validate().is_ok());
}

#[test]
fn test_lift_and_day_bounds() {
    let config = RunConfig { num_lifts: 61, ..RunConfig::default() };
    assert_eq!(invalid_message(&config), "num_lifts must be in 5..=60, got 61");

    let config = RunConfig { num_lifts: 4, ..RunConfig::default() };
    assert!(config.validate().is_err());

    let config = RunConfig { ski_day: 0, ..RunConfig::default() };
    assert_eq!(invalid_message(&config), "ski_day must be in 1..=366, got 0");

    let config = RunConfig { ski_day: 366, num_skiers: 0, ..RunConfig::default() };
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_fields_rejected() {
    let config = RunConfig { resort_id: "  ".to_string(), ..RunConfig::default() };
    assert!(invalid_message(&config).contains("resort_id"));

    let config = RunConfig { server_address: String::new(), ..RunConfig::default() };
    assert!(invalid_message(&config).contains("server_address"));

    let config = RunConfig { timeout_secs: 0, ..RunConfig::default() };
    assert!(invalid_message(&config).contains("timeout_secs"));
}

#[test]
fn test_inverted_phase_window_rejected() {
    let mut config = RunConfig::default();
    config.phases.peak.time_start = 360;
    config.phases.peak.time_end = 91;
    assert_eq!(invalid_message(&config), "peak phase time_start (360) must be below time_end (91)");
}

#[test]
fn test_from_file_parses_without_validating() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skiload.toml");
    std::fs::write(&path, "max_threads = 1000\n").unwrap();

    let config = RunConfig::from_file(&path).unwrap();
    assert_eq!(config.max_threads, 1000);
    assert!(config.validate().is_err());

    std::fs::write(&path, "max_threads = 16\nnum_lifts = 10\n").unwrap();
    let config = RunConfig::from_file(&path).unwrap();
    assert_eq!(config.max_threads, 16);
    assert_eq!(config.num_lifts, 10);
}

#[test]
fn test_from_file_unreadable() {
    let dir = TempDir::new().unwrap();
    let result = RunConfig::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(SkiLoadError::InvalidConfig(msg)) if msg.contains("cannot read")));
}

#[test]
fn test_override_repairs_out_of_range_file_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skiload.toml");
    std::fs::write(&path, "max_threads = 512\nnum_lifts = 3\n").unwrap();

    let mut config = RunConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(invalid_message(&config), "max_threads must be in 4..=256, got 512");

    let overrides = ConfigOverrides { max_threads: Some(64), num_lifts: Some(20), ..ConfigOverrides::default() };
    overrides.apply(&mut config);
    assert!(config.validate().is_ok());
    assert_eq!(config.max_threads, 64);
    assert_eq!(config.num_lifts, 20);
}

#[test]
fn test_override_can_break_valid_file_value() {
    let mut config = RunConfig::default();
    ConfigOverrides { ski_day: Some(400), ..ConfigOverrides::default() }.apply(&mut config);
    assert_eq!(invalid_message(&config), "ski_day must be in 1..=366, got 400");
}

#[test]
fn test_overrides_apply_each_given_field() {
    let mut config = RunConfig { max_threads: 32, ..RunConfig::default() };
    ConfigOverrides::default().apply(&mut config);
    assert_eq!(config, RunConfig { max_threads: 32, ..RunConfig::default() });

    ConfigOverrides {
        resort_id: Some("Whistler".to_string()),
        server_address: Some("http://10.1.1.1:8080".to_string()),
        output_file: Some(PathBuf::from("run.csv")),
        num_skiers: Some(10),
        ..ConfigOverrides::default()
    }
    .apply(&mut config);
    assert_eq!(config.resort_id, "Whistler");
    assert_eq!(config.server_address, "http://10.1.1.1:8080");
    assert_eq!(config.output_path(), PathBuf::from("run.csv"));
    assert_eq!(config.num_skiers, 10);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    assert_eq!(RunConfig::load(Some(missing.as_path())).unwrap(), RunConfig::default());
    assert_eq!(RunConfig::load(None).unwrap(), RunConfig::default());
}

#[test]
fn test_output_path() {
    let config = RunConfig { max_threads: 64, ..RunConfig::default() };
    assert_eq!(config.output_path(), PathBuf::from("latency_64_threads.csv"));

    let config = RunConfig { output_file: Some(PathBuf::from("/tmp/run.csv")), ..RunConfig::default() };
    assert_eq!(config.output_path(), Path::new("/tmp/run.csv"));
}

#[test]
fn test_client_config_uses_timeout() {
    let config = RunConfig { timeout_secs: 7, ..RunConfig::default() };
    let client = config.client_config();
    assert_eq!(client.base_url, DEFAULT_SERVER_ADDRESS);
    assert_eq!(client.connect_timeout, Duration::from_secs(7));
    assert_eq!(client.request_timeout, Duration::from_secs(7));
}
