//! Read side: the latest presentation snapshot and a copy of the event log.
//!
//! Only the monitor writes here, after a tick has been committed. Readers see
//! the last good tick even when the current one failed.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::cost::{estimate_with_quote, ETH_TRANSFER_GAS, USDT_TRANSFER_GAS};
use crate::format::{format_gwei, iso_utc};
use crate::history::{EventLog, EventLogEntry};
use crate::sample::FeeSample;

/// Shape served by `GET /gas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasSnapshot {
    pub safe: String,
    pub propose: String,
    pub fast: String,
    pub base_fee: String,
    pub base_fee_gwei: f64,
    pub last_block: String,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_price_usd: Option<f64>,
    pub eth_transfer_usd: f64,
    pub usdt_transfer_usd: f64,
    pub safe_transfer_usd: f64,
    pub propose_transfer_usd: f64,
    pub fast_transfer_usd: f64,
}

impl GasSnapshot {
    pub fn from_sample(s: &FeeSample, eth_price_usd: Option<f64>) -> Self {
        Self {
            safe: format!("{} Gwei", format_gwei(s.safe_fee)),
            propose: format!("{} Gwei", format_gwei(s.propose_fee)),
            fast: format!("{} Gwei", format_gwei(s.fast_fee)),
            base_fee: format!("{:.6} Gwei", s.base_fee),
            base_fee_gwei: s.base_fee,
            last_block: s.block.clone(),
            last_updated: iso_utc(s.observed_at),
            eth_price_usd,
            eth_transfer_usd: estimate_with_quote(s.base_fee, eth_price_usd, ETH_TRANSFER_GAS),
            usdt_transfer_usd: estimate_with_quote(s.base_fee, eth_price_usd, USDT_TRANSFER_GAS),
            safe_transfer_usd: estimate_with_quote(s.safe_fee, eth_price_usd, ETH_TRANSFER_GAS),
            propose_transfer_usd: estimate_with_quote(
                s.propose_fee,
                eth_price_usd,
                ETH_TRANSFER_GAS,
            ),
            fast_transfer_usd: estimate_with_quote(s.fast_fee, eth_price_usd, ETH_TRANSFER_GAS),
        }
    }
}

#[derive(Debug, Default)]
struct ViewInner {
    snapshot: Option<GasSnapshot>,
    events: EventLog,
}

/// Cheap-to-clone handle shared by the monitor and the HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct QueryView {
    inner: Arc<RwLock<ViewInner>>,
}

impl QueryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: GasSnapshot, events: &EventLog) {
        let mut g = self.inner.write().unwrap_or_else(|p| p.into_inner());
        g.snapshot = Some(snapshot);
        if g.events != *events {
            g.events = events.clone();
        }
    }

    /// Seed the event log at startup, before the first tick.
    pub fn publish_events(&self, events: &EventLog) {
        let mut g = self.inner.write().unwrap_or_else(|p| p.into_inner());
        g.events = events.clone();
    }

    pub fn snapshot(&self) -> Option<GasSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .snapshot
            .clone()
    }

    pub fn recent_events(&self, limit: usize) -> Vec<EventLogEntry> {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .events
            .recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn snapshot_formats_and_prices() {
        let s = FeeSample {
            base_fee: 50.0,
            safe_fee: 50.0,
            propose_fee: 51.0,
            fast_fee: 52.0,
            block: "123".into(),
            observed_at: Utc.with_ymd_and_hms(2025, 5, 19, 8, 9, 20).unwrap(),
        };
        let snap = GasSnapshot::from_sample(&s, Some(2000.0));
        assert_eq!(snap.base_fee, "50.000000 Gwei");
        assert_eq!(snap.safe, "50.0 Gwei");
        assert_eq!(snap.last_updated, "2025-05-19T08:09:20Z");
        assert_eq!(snap.eth_transfer_usd, 2.1);
        assert_eq!(snap.usdt_transfer_usd, 6.5);

        let no_price = GasSnapshot::from_sample(&s, None);
        assert_eq!(no_price.eth_transfer_usd, 0.0);
        let v = serde_json::to_value(&no_price).unwrap();
        assert!(v.get("eth_price_usd").is_none());
    }
}
