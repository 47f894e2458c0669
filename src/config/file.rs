// src/config/file.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const ENV_CONFIG_PATH: &str = "ETHFEE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/ethfee.toml";

/// Optional TOML layer. Every key may be omitted; env vars override it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub etherscan_api_key: Option<String>,
    pub fee_thresholds: Option<Vec<f64>>,
    pub min_event_interval: Option<i64>,
    pub min_delta_gwei: Option<f64>,
    pub big_jump_gwei: Option<f64>,
    pub max_silence: Option<i64>,
    pub poll_interval_secs: Option<u64>,
    pub price_interval_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    pub notify_timeout_secs: Option<u64>,
    pub state_path: Option<PathBuf>,
    pub notify_channels: Option<Vec<String>>,
    pub allowed_origins: Option<Vec<String>>,
    pub metrics_enabled: Option<bool>,
}

impl FileConfig {
    pub fn parse(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::File {
            path: origin.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// 1) `$ETHFEE_CONFIG_PATH` (must exist)
    /// 2) `config/ethfee.toml` if present
    /// 3) nothing
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(&p);
            if !pb.exists() {
                return Err(ConfigError::File {
                    path: p,
                    message: format!("{ENV_CONFIG_PATH} points to a non-existent path"),
                });
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}
