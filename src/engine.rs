//! # Alert Decision Engine
//! Pure, testable logic that maps `(state, sample)` → `(Decision, next state)`.
//! No I/O; the monitor persists the next state before committing it.
//!
//! Policy per sample, in order: bootstrap on the very first fee, otherwise a
//! crossing is announced when it is a big jump or a large enough move outside
//! the debounce window; failing that a heartbeat goes out after a long
//! silence. The last fee is always advanced.

use chrono::{DateTime, Duration, Utc};

use crate::cost::{estimate_with_quote, ETH_TRANSFER_GAS};
use crate::cross::{detect_cross, ThresholdSet};
use crate::error::EngineError;
use crate::format::format_gwei;
use crate::history::EventLogEntry;
use crate::notify::{AlertKind, AlertPayload};
use crate::sample::FeeSample;
use crate::state::EngineState;

/// Numeric knobs of the alert policy. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionConfig {
    /// Debounce floor between two cross alerts.
    pub min_event_interval: Duration,
    /// Smallest move (vs. the previous sample) worth announcing.
    pub min_delta_gwei: f64,
    /// A move at least this large bypasses the debounce floor.
    pub big_jump_gwei: f64,
    /// Heartbeat after this long without any notification.
    pub max_silence: Duration,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_event_interval: Duration::seconds(60),
            min_delta_gwei: 0.3,
            big_jump_gwei: 5.0,
            max_silence: Duration::seconds(43_200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    CrossAlert,
    Heartbeat,
    NoAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    NoAction,
    Notify(AlertPayload),
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::NoAction => DecisionKind::NoAction,
            Decision::Notify(p) => match p.kind {
                AlertKind::Cross { .. } => DecisionKind::CrossAlert,
                AlertKind::Heartbeat => DecisionKind::Heartbeat,
            },
        }
    }

    pub fn payload(&self) -> Option<&AlertPayload> {
        match self {
            Decision::Notify(p) => Some(p),
            Decision::NoAction => None,
        }
    }
}

/// Result of evaluating one sample against the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub decision: Decision,
    pub next: EngineState,
    /// True when this sample only seeded `last_fee`.
    pub bootstrapped: bool,
}

pub struct AlertDecisionEngine {
    thresholds: ThresholdSet,
    config: DecisionConfig,
    state: EngineState,
}

impl AlertDecisionEngine {
    pub fn new(thresholds: ThresholdSet, config: DecisionConfig, state: EngineState) -> Self {
        Self {
            thresholds,
            config,
            state,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Decide on `sample` without touching the committed state.
    ///
    /// `eth_price_usd` is the latest cached quote, if any; it only feeds the
    /// cost figure in the payload.
    pub fn evaluate(
        &self,
        sample: &FeeSample,
        eth_price_usd: Option<f64>,
    ) -> Result<Outcome, EngineError> {
        validate(sample)?;

        let now = sample.observed_at;
        let curr = sample.base_fee;
        let mut next = self.state.clone();
        next.revision = self.state.revision + 1;

        let Some(prev) = self.state.alert.last_fee else {
            next.alert.last_fee = Some(curr);
            return Ok(Outcome {
                decision: Decision::NoAction,
                next,
                bootstrapped: true,
            });
        };

        let delta = curr - prev;
        let abs_delta = delta.abs();
        let event = detect_cross(prev, curr, &self.thresholds);

        let (allow_by_debounce, must_heartbeat) = match self.state.alert.last_notification_at {
            None => (true, true),
            Some(last) => {
                let gap = now.signed_duration_since(last);
                (
                    gap >= self.config.min_event_interval,
                    gap >= self.config.max_silence,
                )
            }
        };
        let big_jump = abs_delta >= self.config.big_jump_gwei;

        let decision = match event {
            Some(ev)
                if big_jump || (abs_delta >= self.config.min_delta_gwei && allow_by_debounce) =>
            {
                next.events.append(EventLogEntry::new(ev, now));
                next.alert.last_notification_at = Some(now);
                Decision::Notify(build_payload(
                    AlertKind::Cross { event: ev, delta },
                    sample,
                    prev,
                    eth_price_usd,
                    now,
                ))
            }
            _ if must_heartbeat => {
                next.alert.last_notification_at = Some(now);
                Decision::Notify(build_payload(
                    AlertKind::Heartbeat,
                    sample,
                    prev,
                    eth_price_usd,
                    now,
                ))
            }
            _ => Decision::NoAction,
        };

        next.alert.last_fee = Some(curr);
        Ok(Outcome {
            decision,
            next,
            bootstrapped: false,
        })
    }

    /// Replace the committed state, normally with `Outcome::next` once it has
    /// been persisted.
    pub fn commit(&mut self, next: EngineState) {
        self.state = next;
    }

    /// `evaluate` + `commit` for callers without a store.
    pub fn process(
        &mut self,
        sample: &FeeSample,
        eth_price_usd: Option<f64>,
    ) -> Result<Decision, EngineError> {
        let outcome = self.evaluate(sample, eth_price_usd)?;
        self.commit(outcome.next);
        Ok(outcome.decision)
    }
}

fn validate(sample: &FeeSample) -> Result<(), EngineError> {
    let fields = [
        ("base_fee", sample.base_fee),
        ("safe_fee", sample.safe_fee),
        ("propose_fee", sample.propose_fee),
        ("fast_fee", sample.fast_fee),
    ];
    if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::InvalidSample { field });
    }
    if sample.block.trim().is_empty() {
        return Err(EngineError::InvalidSample { field: "block" });
    }
    Ok(())
}

fn build_payload(
    kind: AlertKind,
    sample: &FeeSample,
    prev: f64,
    eth_price_usd: Option<f64>,
    now: DateTime<Utc>,
) -> AlertPayload {
    AlertPayload {
        kind,
        base_fee: sample.base_fee,
        prev_fee: prev,
        base_fee_fmt: format_gwei(sample.base_fee),
        safe_fmt: format_gwei(sample.safe_fee),
        propose_fmt: format_gwei(sample.propose_fee),
        fast_fmt: format_gwei(sample.fast_fee),
        block: sample.block.clone(),
        eth_price_usd,
        eth_transfer_usd: estimate_with_quote(sample.base_fee, eth_price_usd, ETH_TRANSFER_GAS),
        at: now,
    }
}
