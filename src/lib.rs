//! Ethereum gas fee monitor: threshold alerts, persisted alert state and a
//! read-only HTTP view. Public surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Decision core (pure, no I/O)
pub mod cost;
pub mod cross;
pub mod engine;
pub mod format;
pub mod history;
pub mod sample;
pub mod state;

// Collaborators: persistence, upstream feeds, notifications, read side
pub mod notify;
pub mod oracle;
pub mod price;
pub mod snapshot;
pub mod store;

// Tick driver & background jobs
pub mod monitor;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::engine::{AlertDecisionEngine, Decision, DecisionConfig, DecisionKind};
pub use crate::notify::{AlertPayload, Channel, NotificationSink, NotifierMux};
