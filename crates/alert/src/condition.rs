use serde::{Deserialize, Serialize};

use lagwatch_common::severity::Severity;

/// Declarative alert rule. Conditions are loaded once at startup and
/// evaluated by the generic detector; there is no per-condition code path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(flatten)]
    pub kind: ConditionKind,
    pub severity: Severity,
    /// How long the predicate must hold continuously before firing.
    #[serde(default)]
    pub for_seconds: u64,
    #[serde(default = "default_group_wait")]
    pub group_wait_seconds: u64,
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionKind {
    /// Latest lag sample for a slot exceeds the threshold.
    LagAbove { threshold_bytes: u64 },
    /// Slot is inactive while retaining more than `min_lag_bytes`.
    InactiveWithLag { min_lag_bytes: u64 },
    /// Lag grew by more than `delta_bytes` over the lookback window while
    /// the slot is inactive. Requires retained history spanning the window.
    LagGrowth { window_seconds: u64, delta_bytes: u64 },
    ConnectorFailed,
    TaskFailed,
    EndpointUnreachable,
}

fn default_group_wait() -> u64 {
    30
}

fn default_repeat_interval() -> u64 {
    14400
}

impl Condition {
    pub fn for_ms(&self) -> i64 {
        self.for_seconds as i64 * 1000
    }

    pub fn group_wait_ms(&self) -> i64 {
        self.group_wait_seconds as i64 * 1000
    }

    pub fn repeat_interval_ms(&self) -> i64 {
        self.repeat_interval_seconds as i64 * 1000
    }
}
