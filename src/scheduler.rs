// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::FetchError;
use crate::monitor::Monitor;
use crate::price::{PriceCache, PriceFeed};

/// Drive `monitor` every `every`. Errors stay inside the tick.
pub fn spawn_poll_loop(mut monitor: Monitor, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = monitor.tick().await {
                counter!("ethfee_tick_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(kind = e.kind(), error = %e, "gas tick skipped");
            }
        }
    })
}

/// Fetch a fresh quote into `cache`. On failure the previous quote stays.
pub async fn refresh_price_once(feed: &dyn PriceFeed, cache: &PriceCache) -> Result<f64, FetchError> {
    let usd = feed.fetch_usd().await?;
    cache.set(usd, Utc::now());
    gauge!("ethfee_eth_price_usd").set(usd);
    tracing::info!(usd = %format!("{usd:.2}"), "updated ETH price");
    Ok(usd)
}

pub fn spawn_price_loop(feed: Arc<dyn PriceFeed>, cache: PriceCache, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = refresh_price_once(feed.as_ref(), &cache).await {
                tracing::warn!(error = %e, "price refresh failed; keeping last quote");
            }
        }
    })
}
