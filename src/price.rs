//! ETH/USD quote: a slow-refresh feed and the shared cache the fast path reads.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::error::FetchError;

pub const COINGECKO_SIMPLE_PRICE: &str = "https://api.coingecko.com/api/v3/simple/price";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub updated_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_usd(&self) -> Result<f64, FetchError>;
}

pub struct CoinGeckoFeed {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl CoinGeckoFeed {
    pub fn new(timeout: Duration) -> Self {
        Self {
            endpoint: COINGECKO_SIMPLE_PRICE.to_string(),
            client: Client::new(),
            timeout,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn fetch_usd(&self) -> Result<f64, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("ids", "ethereum"), ("vs_currencies", "usd")])
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_simple_price(&body)
    }
}

/// `{"ethereum":{"usd":2543.1}}` → `2543.1`
pub fn parse_simple_price(body: &str) -> Result<f64, FetchError> {
    let v: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    v.pointer("/ethereum/usd")
        .and_then(serde_json::Value::as_f64)
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| FetchError::Parse(format!("no ethereum.usd price in {body}")))
}

/// Latest quote, shared between the price loop (writer) and the poll loop.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    inner: Arc<RwLock<Option<PriceQuote>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, usd: f64, updated_at: DateTime<Utc>) {
        let mut slot = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(PriceQuote { usd, updated_at });
    }

    pub fn latest(&self) -> Option<PriceQuote> {
        *self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    pub fn usd(&self) -> Option<f64> {
        self.latest().map(|q| q.usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_price() {
        assert_eq!(parse_simple_price(r#"{"ethereum":{"usd":2543.12}}"#).unwrap(), 2543.12);
        assert!(parse_simple_price(r#"{"ethereum":{}}"#).is_err());
        assert!(parse_simple_price(r#"{"ethereum":{"usd":0}}"#).is_err());
    }

    #[test]
    fn cache_keeps_latest() {
        let cache = PriceCache::new();
        assert_eq!(cache.usd(), None);
        let now = Utc::now();
        cache.set(2000.0, now);
        cache.clone().set(2100.0, now);
        assert_eq!(cache.usd(), Some(2100.0));
    }
}
