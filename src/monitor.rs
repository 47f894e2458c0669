//! # Monitor
//! One tick = fetch → decide → persist → publish → deliver.
//!
//! The engine decides on the committed state without mutating it; the next
//! state is persisted first and only then committed in memory. A failed save
//! makes the whole tick a no-op; on a revision conflict the stored state is
//! reloaded first so the following tick starts from the other writer's
//! result. Delivery happens after the commit, so a transport failure can
//! never roll anything back.

use std::sync::Arc;

use metrics::{counter, gauge};

use crate::cross::ThresholdSet;
use crate::engine::{AlertDecisionEngine, DecisionConfig, DecisionKind};
use crate::error::{StoreError, TickError};
use crate::notify::{Channel, DeliveryReport, NotificationSink};
use crate::oracle::FeeOracle;
use crate::price::PriceCache;
use crate::sample::FeeSample;
use crate::snapshot::{GasSnapshot, QueryView};
use crate::state::EngineState;
use crate::store::StateStore;

/// Collaborators injected at startup.
pub struct MonitorDeps {
    pub oracle: Arc<dyn FeeOracle>,
    pub store: Arc<dyn StateStore>,
    pub sink: Arc<dyn NotificationSink>,
    /// Transports alerts are delivered to.
    pub channels: Vec<Channel>,
    pub prices: PriceCache,
    pub view: QueryView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub decision: DecisionKind,
    pub block: String,
    pub base_fee: f64,
    pub prev_fee: Option<f64>,
    pub bootstrapped: bool,
    pub delivery: Option<DeliveryReport>,
}

pub struct Monitor {
    engine: AlertDecisionEngine,
    deps: MonitorDeps,
}

impl Monitor {
    /// Load persisted state and build the engine. A store failure here is
    /// fatal: starting from defaults would re-alert immediately.
    pub async fn start(
        thresholds: ThresholdSet,
        config: DecisionConfig,
        deps: MonitorDeps,
    ) -> Result<Self, StoreError> {
        let state = deps.store.load().await?.unwrap_or_default();
        tracing::info!(
            revision = state.revision,
            last_fee = ?state.alert.last_fee,
            last_notification_at = ?state.alert.last_notification_at,
            events = state.events.len(),
            "alert state loaded"
        );
        deps.view.publish_events(&state.events);
        Ok(Self {
            engine: AlertDecisionEngine::new(thresholds, config, state),
            deps,
        })
    }

    pub fn state(&self) -> &EngineState {
        self.engine.state()
    }

    /// Another writer got there first: adopt its state so the next tick
    /// evaluates against it. This tick still fails.
    async fn resync(&mut self) {
        match self.deps.store.load().await {
            Ok(Some(fresh)) => {
                tracing::warn!(
                    revision = fresh.revision,
                    last_fee = ?fresh.alert.last_fee,
                    "state changed by another writer; reloaded"
                );
                self.deps.view.publish_events(&fresh.events);
                self.engine.commit(fresh);
            }
            Ok(None) => tracing::warn!("revision conflict but store is empty; keeping state"),
            Err(e) => tracing::warn!(error = %e, "reload after revision conflict failed"),
        }
    }

    /// Fetch one sample and process it.
    pub async fn tick(&mut self) -> Result<TickReport, TickError> {
        let sample = self.deps.oracle.fetch().await?;
        self.process_sample(sample).await
    }

    pub async fn process_sample(&mut self, sample: FeeSample) -> Result<TickReport, TickError> {
        counter!("ethfee_ticks_total").increment(1);

        let price = self.deps.prices.usd();
        let prev_fee = self.engine.state().alert.last_fee;
        let outcome = self.engine.evaluate(&sample, price)?;

        if let Err(e) = self.deps.store.save(&outcome.next).await {
            if matches!(e, StoreError::Conflict { .. }) {
                self.resync().await;
            }
            return Err(e.into());
        }
        self.engine.commit(outcome.next);

        gauge!("ethfee_base_fee_gwei").set(sample.base_fee);
        self.deps.view.publish(
            GasSnapshot::from_sample(&sample, price),
            &self.engine.state().events,
        );

        tracing::info!(
            block = %sample.block,
            base_fee = %format!("{:.6}", sample.base_fee),
            prev = ?prev_fee,
            "gas sample processed"
        );
        if outcome.bootstrapped {
            tracing::info!(base_fee = sample.base_fee, "first sample, seeded last fee");
        }

        let kind = outcome.decision.kind();
        let delivery = match outcome.decision.payload() {
            Some(payload) => {
                let label = match kind {
                    DecisionKind::CrossAlert => "cross",
                    _ => "heartbeat",
                };
                counter!("ethfee_notifications_total", "kind" => label).increment(1);
                tracing::info!(kind = label, block = %payload.block, "notifying");
                let report = self.deps.sink.deliver(payload, &self.deps.channels).await;
                if !report.all_ok() {
                    tracing::warn!(failed = report.failed.len(), "some channels failed; not retrying");
                }
                Some(report)
            }
            None => None,
        };

        Ok(TickReport {
            decision: kind,
            block: sample.block,
            base_fee: sample.base_fee,
            prev_fee,
            bootstrapped: outcome.bootstrapped,
            delivery,
        })
    }
}
