//! Bounded log of threshold crossings, most recent first.
//!
//! Only genuine cross alerts land here; heartbeats do not.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cross::{CrossEvent, Direction};

/// Number of entries kept; older ones are dropped on insert.
pub const EVENT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub threshold: f64,
    pub direction: Direction,
    pub logged_at: DateTime<Utc>,
}

impl EventLogEntry {
    pub fn new(event: CrossEvent, logged_at: DateTime<Utc>) -> Self {
        Self {
            threshold: event.threshold,
            direction: event.direction,
            logged_at,
        }
    }
}

/// Capped sequence with trim-on-insert. Front is the newest entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: VecDeque<EventLogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend, then drop whatever falls beyond the capacity.
    pub fn append(&mut self, entry: EventLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(EVENT_LOG_CAPACITY);
    }

    /// Up to `limit` entries, newest first. `limit` is clamped to the capacity.
    pub fn recent(&self, limit: usize) -> Vec<EventLogEntry> {
        self.entries
            .iter()
            .take(limit.min(EVENT_LOG_CAPACITY))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A persisted log written by an older build may hold more than we keep now.
    pub(crate) fn enforce_capacity(&mut self) {
        self.entries.truncate(EVENT_LOG_CAPACITY);
    }
}
