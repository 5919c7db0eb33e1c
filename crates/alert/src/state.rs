use serde::{Deserialize, Serialize};

/// Per-instance alert lifecycle. `Resolved` is retained for a bounded
/// window so a flapping predicate re-enters `Pending` with a fresh timer
/// instead of re-firing instantly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AlertState {
    Inactive,
    Pending { since_ms: i64 },
    Firing { since_ms: i64 },
    Resolved { at_ms: i64 },
}

impl AlertState {
    pub fn transition(self, met: bool, now_ms: i64, for_ms: i64, retention_ms: i64) -> Self {
        match (self, met) {
            (Self::Inactive, true) => {
                if for_ms == 0 {
                    Self::Firing { since_ms: now_ms }
                } else {
                    Self::Pending { since_ms: now_ms }
                }
            }
            (Self::Inactive, false) => Self::Inactive,

            (Self::Pending { since_ms }, true) => {
                if now_ms - since_ms >= for_ms {
                    Self::Firing { since_ms }
                } else {
                    Self::Pending { since_ms }
                }
            }
            // Any gap resets the duration timer entirely.
            (Self::Pending { .. }, false) => Self::Inactive,

            (Self::Firing { since_ms }, true) => Self::Firing { since_ms },
            (Self::Firing { .. }, false) => Self::Resolved { at_ms: now_ms },

            // Re-breach within retention starts over from pending; the
            // "for" duration must be satisfied again.
            (Self::Resolved { .. }, true) => {
                if for_ms == 0 {
                    Self::Firing { since_ms: now_ms }
                } else {
                    Self::Pending { since_ms: now_ms }
                }
            }
            (Self::Resolved { at_ms }, false) => {
                if now_ms - at_ms >= retention_ms {
                    Self::Inactive
                } else {
                    Self::Resolved { at_ms }
                }
            }
        }
    }

    pub fn is_firing(&self) -> bool {
        matches!(self, Self::Firing { .. })
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Inactive)
    }
}
