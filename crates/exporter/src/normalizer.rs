use lagwatch_common::snapshot::EndpointSnapshot;
use lagwatch_common::status::{ConnectorState, ConnectorStatus, Reachability, TaskStatus};

use crate::poller::RawEndpointStatus;

/// Maps one endpoint's raw listing into the uniform status model. Sorted
/// by connector name so identical payloads always normalize identically.
pub fn normalize(endpoint: &str, raw: &RawEndpointStatus, now_ms: i64) -> EndpointSnapshot {
    let mut connectors = Vec::with_capacity(raw.len());
    let mut tasks = Vec::new();

    let mut names: Vec<&String> = raw.keys().collect();
    names.sort();

    for name in names {
        let entry = &raw[name];
        connectors.push(ConnectorStatus {
            endpoint: endpoint.to_string(),
            connector: name.clone(),
            state: ConnectorState::from_api(&entry.status.connector.state),
            timestamp_ms: now_ms,
        });
        for task in &entry.status.tasks {
            tasks.push(TaskStatus {
                endpoint: endpoint.to_string(),
                connector: name.clone(),
                task: task.id,
                state: ConnectorState::from_api(&task.state),
                timestamp_ms: now_ms,
            });
        }
    }

    EndpointSnapshot {
        endpoint: endpoint.to_string(),
        reachability: Reachability::Reachable,
        polled_at_ms: now_ms,
        connectors,
        tasks,
    }
}
