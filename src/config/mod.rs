//! Process configuration: defaults ← optional TOML file ← environment.
//!
//! Read once at startup; changing anything requires a restart.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::cross::ThresholdSet;
use crate::engine::DecisionConfig;
use crate::error::ConfigError;
use crate::notify::Channel;

pub use file::FileConfig;

pub const DEFAULT_STATE_PATH: &str = "state/alert_state.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Polling is disabled without it; the HTTP side still serves.
    pub etherscan_api_key: Option<String>,
    pub thresholds: ThresholdSet,
    pub decision: DecisionConfig,
    pub poll_interval: Duration,
    pub price_interval: Duration,
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
    pub state_path: PathBuf,
    /// `None` = every channel that has credentials.
    pub channels: Option<Vec<Channel>>,
    /// Empty = permissive CORS.
    pub allowed_origins: Vec<String>,
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            etherscan_api_key: None,
            thresholds: ThresholdSet::default(),
            decision: DecisionConfig::default(),
            poll_interval: Duration::from_secs(10),
            price_interval: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(5),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            channels: None,
            allowed_origins: Vec::new(),
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    /// Load `.env`-populated process environment on top of the config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = FileConfig::load_default()?;
        Self::from_layers(file, |k| std::env::var(k).ok())
    }

    /// Build from a file layer and an env lookup (env wins).
    pub fn from_layers<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.apply_file(file)?;
        cfg.apply_env(&env)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_file(&mut self, f: FileConfig) -> Result<(), ConfigError> {
        if let Some(k) = f.etherscan_api_key {
            self.etherscan_api_key = Some(k);
        }
        if let Some(mut levels) = f.fee_thresholds {
            levels.sort_by(f64::total_cmp);
            levels.dedup();
            self.thresholds = ThresholdSet::new(levels)?;
        }
        if let Some(v) = f.min_event_interval {
            self.decision.min_event_interval = seconds("MIN_EVENT_INTERVAL", v)?;
        }
        if let Some(v) = f.min_delta_gwei {
            self.decision.min_delta_gwei = v;
        }
        if let Some(v) = f.big_jump_gwei {
            self.decision.big_jump_gwei = v;
        }
        if let Some(v) = f.max_silence {
            self.decision.max_silence = seconds("MAX_SILENCE", v)?;
        }
        if let Some(v) = f.poll_interval_secs {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = f.price_interval_secs {
            self.price_interval = Duration::from_secs(v);
        }
        if let Some(v) = f.fetch_timeout_secs {
            self.fetch_timeout = Duration::from_secs(v);
        }
        if let Some(v) = f.notify_timeout_secs {
            self.notify_timeout = Duration::from_secs(v);
        }
        if let Some(p) = f.state_path {
            self.state_path = p;
        }
        if let Some(list) = f.notify_channels {
            self.channels = Some(parse_channels(list.iter().map(String::as_str))?);
        }
        if let Some(origins) = f.allowed_origins {
            self.allowed_origins = origins;
        }
        if let Some(on) = f.metrics_enabled {
            self.metrics_enabled = on;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(k) = get("ETHERSCAN_API_KEY") {
            self.etherscan_api_key = Some(k);
        }
        if let Some(raw) = get("FEE_THRESHOLDS") {
            self.thresholds = ThresholdSet::parse_csv(&raw)?;
        }
        if let Some(v) = parse_key::<i64>(&get, "MIN_EVENT_INTERVAL")? {
            self.decision.min_event_interval = seconds("MIN_EVENT_INTERVAL", v)?;
        }
        if let Some(v) = parse_key::<f64>(&get, "MIN_DELTA_GWEI")? {
            self.decision.min_delta_gwei = v;
        }
        if let Some(v) = parse_key::<f64>(&get, "BIG_JUMP_GWEI")? {
            self.decision.big_jump_gwei = v;
        }
        if let Some(v) = parse_key::<i64>(&get, "MAX_SILENCE")? {
            self.decision.max_silence = seconds("MAX_SILENCE", v)?;
        }
        if let Some(v) = parse_key::<u64>(&get, "POLL_INTERVAL_SECS")? {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = parse_key::<u64>(&get, "PRICE_INTERVAL_SECS")? {
            self.price_interval = Duration::from_secs(v);
        }
        if let Some(v) = parse_key::<u64>(&get, "FETCH_TIMEOUT_SECS")? {
            self.fetch_timeout = Duration::from_secs(v);
        }
        if let Some(v) = parse_key::<u64>(&get, "NOTIFY_TIMEOUT_SECS")? {
            self.notify_timeout = Duration::from_secs(v);
        }
        if let Some(p) = get("STATE_PATH") {
            self.state_path = PathBuf::from(p);
        }
        if let Some(raw) = get("NOTIFY_CHANNELS") {
            self.channels = Some(parse_channels(csv(&raw))?);
        }
        if let Some(raw) = get("ALLOWED_ORIGINS") {
            self.allowed_origins = csv(&raw).map(str::to_string).collect();
        }
        if let Some(raw) = get("METRICS_ENABLED") {
            self.metrics_enabled = matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.decision;
        if d.min_event_interval < ChronoDuration::zero() {
            return invalid("MIN_EVENT_INTERVAL", d.min_event_interval.num_seconds());
        }
        if d.max_silence <= ChronoDuration::zero() {
            return invalid("MAX_SILENCE", d.max_silence.num_seconds());
        }
        if !(d.min_delta_gwei.is_finite() && d.min_delta_gwei >= 0.0) {
            return invalid("MIN_DELTA_GWEI", d.min_delta_gwei);
        }
        if !(d.big_jump_gwei.is_finite() && d.big_jump_gwei > 0.0) {
            return invalid("BIG_JUMP_GWEI", d.big_jump_gwei);
        }
        for (key, v) in [
            ("POLL_INTERVAL_SECS", self.poll_interval),
            ("PRICE_INTERVAL_SECS", self.price_interval),
            ("FETCH_TIMEOUT_SECS", self.fetch_timeout),
            ("NOTIFY_TIMEOUT_SECS", self.notify_timeout),
        ] {
            if v.is_zero() {
                return invalid(key, 0);
            }
        }
        Ok(())
    }
}

/// Seconds outside chrono's range are a config error, not a panic.
fn seconds(key: &'static str, v: i64) -> Result<ChronoDuration, ConfigError> {
    ChronoDuration::try_seconds(v).ok_or(ConfigError::Invalid {
        key,
        value: v.to_string(),
    })
}

fn invalid(key: &'static str, value: impl ToString) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_key<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn csv(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_channels<'a>(items: impl Iterator<Item = &'a str>) -> Result<Vec<Channel>, ConfigError> {
    let mut out = Vec::new();
    for item in items {
        let ch: Channel = item.parse().map_err(|_| ConfigError::Invalid {
            key: "NOTIFY_CHANNELS",
            value: item.to_string(),
        })?;
        if !out.contains(&ch) {
            out.push(ch);
        }
    }
    Ok(out)
}
