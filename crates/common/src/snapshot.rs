use std::collections::BTreeMap;

use serde::Serialize;

use crate::status::{ConnectorState, ConnectorStatus, Reachability, TaskStatus};

/// Everything known about one endpoint from a single poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSnapshot {
    pub endpoint: String,
    pub reachability: Reachability,
    pub polled_at_ms: i64,
    pub connectors: Vec<ConnectorStatus>,
    pub tasks: Vec<TaskStatus>,
}

impl EndpointSnapshot {
    /// Marker entry for a failed scrape: unreachable, no fabricated state.
    pub fn unreachable(endpoint: &str, polled_at_ms: i64) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            reachability: Reachability::Unreachable,
            polled_at_ms,
            connectors: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// Immutable point-in-time view over all endpoints. Published whole per
/// poll cycle and shared behind an `Arc`; readers never see a partially
/// updated cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub endpoints: BTreeMap<String, EndpointSnapshot>,
}

impl Snapshot {
    pub fn get(&self, endpoint: &str) -> Option<&EndpointSnapshot> {
        self.endpoints.get(endpoint)
    }

    pub fn failed_connectors(&self) -> usize {
        self.endpoints
            .values()
            .flat_map(|e| e.connectors.iter())
            .filter(|c| c.state == ConnectorState::Failed)
            .count()
    }

    pub fn failed_tasks(&self) -> usize {
        self.endpoints
            .values()
            .flat_map(|e| e.tasks.iter())
            .filter(|t| t.state == ConnectorState::Failed)
            .count()
    }

    pub fn connectors(&self) -> impl Iterator<Item = &ConnectorStatus> {
        self.endpoints.values().flat_map(|e| e.connectors.iter())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskStatus> {
        self.endpoints.values().flat_map(|e| e.tasks.iter())
    }
}
