//! Sends one cross alert and one heartbeat through every configured channel
//! (logs only when no credentials are set).

use std::time::Duration;

use chrono::Utc;
use ethfee_monitor::cross::{CrossEvent, Direction};
use ethfee_monitor::format::format_gwei;
use ethfee_monitor::notify::AlertKind;
use ethfee_monitor::{AlertPayload, Channel, NotificationSink, NotifierMux};

fn payload(kind: AlertKind, base_fee: f64, prev_fee: f64) -> AlertPayload {
    AlertPayload {
        kind,
        base_fee,
        prev_fee,
        base_fee_fmt: format_gwei(base_fee),
        safe_fmt: format_gwei(base_fee),
        propose_fmt: format_gwei(base_fee * 1.02),
        fast_fmt: format_gwei(base_fee * 1.1),
        block: "22513301".into(),
        eth_price_usd: None,
        eth_transfer_usd: 0.0,
        at: Utc::now(),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();
    let mux = NotifierMux::from_env(Duration::from_secs(5));

    let seq = [
        payload(
            AlertKind::Cross {
                event: CrossEvent { threshold: 20.0, direction: Direction::Above },
                delta: 1.37,
            },
            21.37,
            20.0,
        ),
        payload(AlertKind::Heartbeat, 21.4, 21.37),
    ];

    for p in &seq {
        let report = mux.deliver(p, &Channel::ALL).await;
        tracing::info!(delivered = ?report.delivered, failed = ?report.failed, "demo alert sent");
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
}
