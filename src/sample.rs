//! Gas oracle readings fed to the decision engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reading of the gas oracle, produced once per poll tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSample {
    /// Suggested base fee, Gwei.
    pub base_fee: f64,
    pub safe_fee: f64,
    pub propose_fee: f64,
    pub fast_fee: f64,
    /// Last block the oracle looked at. Opaque to us.
    pub block: String,
    pub observed_at: DateTime<Utc>,
}
