use std::fmt::Write;
use std::sync::Arc;

use lagwatch_common::snapshot::Snapshot;
use lagwatch_common::status::{ConnectorState, Reachability};

use super::exporter_metrics::ExporterMetrics;

/// Renders the text exposition for one snapshot. One series per
/// connector/task and state so a flip from RUNNING to FAILED moves a 1
/// between existing series instead of creating and dropping them.
pub fn render_prometheus(snapshot: &Snapshot, m: &Arc<ExporterMetrics>) -> String {
    let mut out = String::with_capacity(4096);

    let _ = writeln!(out, "# TYPE kafka_connect_up gauge");
    for (id, endpoint) in &snapshot.endpoints {
        let up = u64::from(endpoint.reachability == Reachability::Reachable);
        let _ = writeln!(out, "kafka_connect_up{{endpoint=\"{id}\"}} {up}");
    }

    let _ = writeln!(out, "# TYPE kafka_connect_connector_state gauge");
    for connector in snapshot.connectors() {
        for state in ConnectorState::ALL {
            let _ = writeln!(
                out,
                "kafka_connect_connector_state{{connector=\"{}\",state=\"{}\",endpoint=\"{}\"}} {}",
                connector.connector,
                state.as_str(),
                connector.endpoint,
                u64::from(connector.state == state),
            );
        }
    }

    let _ = writeln!(out, "# TYPE kafka_connect_connector_task_state gauge");
    for task in snapshot.tasks() {
        for state in ConnectorState::ALL {
            let _ = writeln!(
                out,
                "kafka_connect_connector_task_state{{connector=\"{}\",task=\"{}\",state=\"{}\",endpoint=\"{}\"}} {}",
                task.connector,
                task.task,
                state.as_str(),
                task.endpoint,
                u64::from(task.state == state),
            );
        }
    }

    let _ = writeln!(out, "# TYPE kafka_connect_connectors_total gauge");
    for (id, endpoint) in &snapshot.endpoints {
        let _ = writeln!(
            out,
            "kafka_connect_connectors_total{{endpoint=\"{id}\"}} {}",
            endpoint.connectors.len()
        );
    }

    let _ = writeln!(out, "# TYPE kafka_connect_connectors_running gauge");
    for (id, endpoint) in &snapshot.endpoints {
        let running = endpoint
            .connectors
            .iter()
            .filter(|c| c.state == ConnectorState::Running)
            .count();
        let _ = writeln!(
            out,
            "kafka_connect_connectors_running{{endpoint=\"{id}\"}} {running}"
        );
    }

    let _ = writeln!(out, "# TYPE kafka_connect_connectors_failed gauge");
    for (id, endpoint) in &snapshot.endpoints {
        let failed = endpoint
            .connectors
            .iter()
            .filter(|c| c.state == ConnectorState::Failed)
            .count();
        let _ = writeln!(
            out,
            "kafka_connect_connectors_failed{{endpoint=\"{id}\"}} {failed}"
        );
    }

    write_gauge(
        &mut out,
        "lagwatch_failed_connectors",
        snapshot.failed_connectors() as u64,
    );
    write_gauge(
        &mut out,
        "lagwatch_failed_tasks",
        snapshot.failed_tasks() as u64,
    );

    write_counter(&mut out, "lagwatch_poll_cycles_total", m.poll_cycles_total());
    write_counter(
        &mut out,
        "lagwatch_poll_failures_total",
        m.poll_failures_total(),
    );
    write_counter(
        &mut out,
        "lagwatch_evaluation_ticks_total",
        m.evaluation_ticks_total(),
    );
    write_counter(&mut out, "lagwatch_lag_samples_total", m.lag_samples_total());
    write_counter(
        &mut out,
        "lagwatch_lag_samples_discarded_total",
        m.lag_samples_discarded_total(),
    );
    write_counter(&mut out, "lagwatch_alerts_fired_total", m.alerts_fired_total());
    write_counter(
        &mut out,
        "lagwatch_alerts_resolved_total",
        m.alerts_resolved_total(),
    );
    write_counter(
        &mut out,
        "lagwatch_notifications_sent_total",
        m.notifications_sent_total(),
    );
    write_counter(
        &mut out,
        "lagwatch_notifications_failed_total",
        m.notifications_failed_total(),
    );
    write_counter(
        &mut out,
        "lagwatch_notifications_suppressed_total",
        m.notifications_suppressed_total(),
    );

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_gauge(out: &mut String, name: &str, val: u64) {
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {val}");
}
