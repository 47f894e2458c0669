// tests/config_env.rs
//
// Process-level config loading: TOML file layer + env overrides.
// Serialized because it mutates process env.

use std::io::Write;
use std::time::Duration;

use ethfee_monitor::config::AppConfig;
use ethfee_monitor::error::ConfigError;
use ethfee_monitor::notify::Channel;

const KEYS: &[&str] = &[
    "ETHFEE_CONFIG_PATH",
    "ETHERSCAN_API_KEY",
    "FEE_THRESHOLDS",
    "MIN_EVENT_INTERVAL",
    "MIN_DELTA_GWEI",
    "BIG_JUMP_GWEI",
    "MAX_SILENCE",
    "POLL_INTERVAL_SECS",
    "NOTIFY_CHANNELS",
    "ALLOWED_ORIGINS",
    "METRICS_ENABLED",
];

fn clear_env() {
    for k in KEYS {
        std::env::remove_var(k);
    }
}

#[test]
#[serial_test::serial]
fn file_layer_then_env_override() {
    clear_env();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"
etherscan_api_key = "from-file"
fee_thresholds = [30.0, 10.0, 20.0]
min_delta_gwei = 0.5
poll_interval_secs = 15
notify_channels = ["telegram", "discord"]
"#
    )
    .unwrap();

    std::env::set_var("ETHFEE_CONFIG_PATH", f.path());
    std::env::set_var("MIN_DELTA_GWEI", "0.75");
    std::env::set_var("ALLOWED_ORIGINS", "https://a.example, https://b.example");

    let cfg = AppConfig::from_env().expect("config loads");
    clear_env();

    assert_eq!(cfg.etherscan_api_key.as_deref(), Some("from-file"));
    assert_eq!(cfg.thresholds.levels(), &[10.0, 20.0, 30.0]);
    assert_eq!(cfg.decision.min_delta_gwei, 0.75);
    assert_eq!(cfg.poll_interval, Duration::from_secs(15));
    assert_eq!(cfg.channels, Some(vec![Channel::Telegram, Channel::Discord]));
    assert_eq!(
        cfg.allowed_origins,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
    assert!(!cfg.metrics_enabled);
}

#[test]
#[serial_test::serial]
fn env_thresholds_and_intervals() {
    clear_env();
    std::env::set_var("FEE_THRESHOLDS", "5, 1,3");
    std::env::set_var("MIN_EVENT_INTERVAL", "120");
    std::env::set_var("MAX_SILENCE", "3600");
    std::env::set_var("METRICS_ENABLED", "true");

    let cfg = AppConfig::from_env().expect("config loads");
    clear_env();

    assert_eq!(cfg.thresholds.levels(), &[1.0, 3.0, 5.0]);
    assert_eq!(cfg.decision.min_event_interval.num_seconds(), 120);
    assert_eq!(cfg.decision.max_silence.num_seconds(), 3600);
    assert!(cfg.metrics_enabled);
    assert!(cfg.etherscan_api_key.is_none());
}

#[test]
#[serial_test::serial]
fn malformed_values_are_rejected() {
    clear_env();
    std::env::set_var("BIG_JUMP_GWEI", "lots");
    let err = AppConfig::from_env().unwrap_err();
    clear_env();
    assert_eq!(
        err,
        ConfigError::Invalid {
            key: "BIG_JUMP_GWEI",
            value: "lots".into()
        }
    );

    std::env::set_var("FEE_THRESHOLDS", "10,-2");
    let err = AppConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(err, ConfigError::Thresholds(_)));
}

#[test]
#[serial_test::serial]
fn missing_config_path_is_an_error() {
    clear_env();
    std::env::set_var("ETHFEE_CONFIG_PATH", "/definitely/not/here.toml");
    let err = AppConfig::from_env().unwrap_err();
    clear_env();
    assert!(matches!(err, ConfigError::File { .. }));
}
