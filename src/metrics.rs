use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("ethfee_ticks_total", "Gas samples handed to the decision engine");
        describe_counter!("ethfee_tick_failures_total", "Ticks skipped, by error kind");
        describe_counter!("ethfee_notifications_total", "Notifications emitted, by kind");
        describe_counter!("ethfee_delivery_failures_total", "Failed deliveries, by channel");
        describe_gauge!("ethfee_base_fee_gwei", "Latest suggested base fee");
        describe_gauge!("ethfee_eth_price_usd", "Latest cached ETH/USD quote");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
