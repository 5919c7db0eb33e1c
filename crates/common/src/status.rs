use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the Connect REST API for a connector or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorState {
    Running,
    Paused,
    Failed,
    Unassigned,
    Unknown,
}

impl ConnectorState {
    /// Upstream state strings are upper-case; anything unrecognized maps to
    /// `Unknown` instead of failing the cycle.
    pub fn from_api(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "paused" => Self::Paused,
            "failed" => Self::Failed,
            "unassigned" => Self::Unassigned,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Failed => "failed",
            Self::Unassigned => "unassigned",
            Self::Unknown => "unknown",
        }
    }

    pub const ALL: [ConnectorState; 5] = [
        Self::Running,
        Self::Paused,
        Self::Failed,
        Self::Unassigned,
        Self::Unknown,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Unknown,
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Reachable => "reachable",
            Self::Unreachable => "unreachable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorStatus {
    pub endpoint: String,
    pub connector: String,
    pub state: ConnectorState,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatus {
    pub endpoint: String,
    pub connector: String,
    pub task: u32,
    pub state: ConnectorState,
    pub timestamp_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_api_known_states() {
        assert_eq!(ConnectorState::from_api("RUNNING"), ConnectorState::Running);
        assert_eq!(ConnectorState::from_api("failed"), ConnectorState::Failed);
        assert_eq!(ConnectorState::from_api("Paused"), ConnectorState::Paused);
        assert_eq!(
            ConnectorState::from_api("UNASSIGNED"),
            ConnectorState::Unassigned
        );
    }

    #[test]
    fn from_api_unrecognized_maps_to_unknown() {
        assert_eq!(
            ConnectorState::from_api("RESTARTING"),
            ConnectorState::Unknown
        );
        assert_eq!(ConnectorState::from_api(""), ConnectorState::Unknown);
    }

    #[test]
    fn state_round_trips_as_str() {
        for state in ConnectorState::ALL {
            if state != ConnectorState::Unknown {
                assert_eq!(ConnectorState::from_api(state.as_str()), state);
            }
        }
    }
}
