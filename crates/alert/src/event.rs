use serde::{Deserialize, Serialize};

use lagwatch_common::labels::LabelSet;
use lagwatch_common::severity::Severity;

/// Structured event handed to the external alert router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: String,
    pub fingerprint: String,
    pub condition: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub labels: LabelSet,
    pub value: f64,
    pub started_at_ms: i64,
    pub resolved_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

impl AlertEvent {
    pub fn status_str(&self) -> &'static str {
        match self.status {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
        }
    }
}
