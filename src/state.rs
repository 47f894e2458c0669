//! Durable state owned by the decision engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::EventLog;

/// Last observed fee and the last time anything was sent out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    /// `None` until the first sample is processed.
    pub last_fee: Option<f64>,
    /// `None` until the first notification is ever emitted.
    pub last_notification_at: Option<DateTime<Utc>>,
}

/// Everything that has to survive a restart, as one record.
///
/// `revision` increases by one on every committed tick and lets a store
/// detect a concurrent writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub alert: AlertState,
    #[serde(default)]
    pub events: EventLog,
}

impl EngineState {
    pub(crate) fn normalized(mut self) -> Self {
        self.events.enforce_capacity();
        self
    }
}
