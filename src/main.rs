//! ethfee monitor binary entrypoint.
//! Loads config, restores alert state, spawns the gas and price loops, and
//! serves the read-only HTTP API.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::{axum::Router, ShuttleAxum};

use ethfee_monitor::api::{self, AppState};
use ethfee_monitor::config::AppConfig;
use ethfee_monitor::metrics::Metrics;
use ethfee_monitor::monitor::{Monitor, MonitorDeps};
use ethfee_monitor::notify::NotifierMux;
use ethfee_monitor::oracle::EtherscanOracle;
use ethfee_monitor::price::{CoinGeckoFeed, PriceCache};
use ethfee_monitor::scheduler::{spawn_poll_loop, spawn_price_loop};
use ethfee_monitor::snapshot::QueryView;
use ethfee_monitor::store::FileStore;
use ethfee_monitor::telemetry;

async fn build() -> anyhow::Result<Router> {
    let cfg = AppConfig::from_env().context("load configuration")?;
    tracing::info!(
        thresholds = ?cfg.thresholds.levels(),
        min_event_interval = cfg.decision.min_event_interval.num_seconds(),
        min_delta_gwei = cfg.decision.min_delta_gwei,
        big_jump_gwei = cfg.decision.big_jump_gwei,
        max_silence = cfg.decision.max_silence.num_seconds(),
        "configuration loaded"
    );

    let metrics = if cfg.metrics_enabled {
        Some(Metrics::init()?)
    } else {
        None
    };

    let view = QueryView::new();
    let prices = PriceCache::new();

    let feed = Arc::new(CoinGeckoFeed::new(cfg.fetch_timeout));
    spawn_price_loop(feed, prices.clone(), cfg.price_interval);

    match cfg.etherscan_api_key.clone() {
        Some(key) => {
            let mux = NotifierMux::from_env(cfg.notify_timeout);
            let channels = cfg.channels.clone().unwrap_or_else(|| mux.channels());
            let deps = MonitorDeps {
                oracle: Arc::new(EtherscanOracle::new(key, cfg.fetch_timeout)),
                store: Arc::new(FileStore::new(&cfg.state_path)),
                sink: Arc::new(mux),
                channels,
                prices: prices.clone(),
                view: view.clone(),
            };
            let monitor = Monitor::start(cfg.thresholds.clone(), cfg.decision.clone(), deps)
                .await
                .with_context(|| format!("restore alert state from {}", cfg.state_path.display()))?;
            spawn_poll_loop(monitor, cfg.poll_interval);
        }
        None => tracing::warn!("ETHERSCAN_API_KEY missing; gas polling disabled"),
    }

    Ok(api::router(
        AppState { view },
        &cfg.allowed_origins,
        metrics.as_ref(),
    ))
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let router = build().await?;
    Ok(router.into())
}
