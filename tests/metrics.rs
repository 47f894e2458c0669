// tests/metrics.rs
//
// Installs the global Prometheus recorder, so this file holds a single test
// (each tests/*.rs is its own process).

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use tower::ServiceExt;

use ethfee_monitor::api::{self, AppState};
use ethfee_monitor::cross::ThresholdSet;
use ethfee_monitor::engine::DecisionConfig;
use ethfee_monitor::error::FetchError;
use ethfee_monitor::metrics::Metrics;
use ethfee_monitor::monitor::{Monitor, MonitorDeps};
use ethfee_monitor::notify::{AlertPayload, Channel, DeliveryReport, NotificationSink};
use ethfee_monitor::oracle::FeeOracle;
use ethfee_monitor::price::PriceCache;
use ethfee_monitor::sample::FeeSample;
use ethfee_monitor::snapshot::QueryView;
use ethfee_monitor::store::MemoryStore;

struct Offline;

#[async_trait::async_trait]
impl FeeOracle for Offline {
    async fn fetch(&self) -> Result<FeeSample, FetchError> {
        Err(FetchError::Status(503))
    }
}

struct Discard;

#[async_trait::async_trait]
impl NotificationSink for Discard {
    async fn deliver(&self, _payload: &AlertPayload, channels: &[Channel]) -> DeliveryReport {
        DeliveryReport {
            delivered: channels.to_vec(),
            failed: Vec::new(),
        }
    }
}

#[tokio::test]
async fn metrics_endpoint_exposes_tick_series() {
    let metrics = Metrics::init().expect("install recorder");
    let view = QueryView::new();
    let deps = MonitorDeps {
        oracle: Arc::new(Offline),
        store: Arc::new(MemoryStore::new()),
        sink: Arc::new(Discard),
        channels: vec![Channel::Slack],
        prices: PriceCache::new(),
        view: view.clone(),
    };
    let mut monitor = Monitor::start(ThresholdSet::default(), DecisionConfig::default(), deps)
        .await
        .unwrap();

    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    for (i, fee) in [4.0, 9.0].into_iter().enumerate() {
        let sample = FeeSample {
            base_fee: fee,
            safe_fee: fee,
            propose_fee: fee,
            fast_fee: fee,
            block: format!("{}", 100 + i),
            observed_at: t0 + Duration::minutes(i as i64 * 5),
        };
        monitor.process_sample(sample).await.unwrap();
    }

    let app = api::router(AppState { view }, &[], Some(&metrics));
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "ethfee_ticks_total 2",
        "ethfee_base_fee_gwei 9",
        "ethfee_notifications_total{kind=\"cross\"} 1",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
