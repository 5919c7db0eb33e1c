use serde::{Deserialize, Serialize};

/// One replication-slot lag observation from the co-located collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagSample {
    pub slot: String,
    pub lag_bytes: u64,
    pub active: bool,
    pub timestamp_ms: i64,
}
