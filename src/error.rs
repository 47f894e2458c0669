//! Error taxonomy for the monitor.
//!
//! Every kind is absorbed at the tick boundary (see `monitor`); none of them
//! is allowed to terminate the process once it is running.

use thiserror::Error;

/// Raised by the decision engine. No state is mutated when this is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid sample: field `{field}` is missing or not a finite number")]
    InvalidSample { field: &'static str },
}

/// Sample or price acquisition failed (owned by the poller side).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("upstream error: {message}")]
    Upstream { message: String },
    #[error("cannot parse upstream response: {0}")]
    Parse(String),
}

/// The state store could not load or save the persisted engine state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("persisted state is corrupt: {0}")]
    Corrupt(String),
    #[error("state revision conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },
    #[error("state store unavailable")]
    Unavailable,
}

/// Startup configuration problems. Fatal before the loops start.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("invalid fee thresholds: {0}")]
    Thresholds(String),
    #[error("config file {path}: {message}")]
    File { path: String, message: String },
}

/// Everything that can make a single tick a no-op.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    UpstreamFetch(#[from] FetchError),
    #[error(transparent)]
    InvalidSample(#[from] EngineError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl TickError {
    /// Short label used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            TickError::UpstreamFetch(_) => "upstream_fetch",
            TickError::InvalidSample(_) => "invalid_sample",
            TickError::Persistence(_) => "persistence",
        }
    }
}
