use std::collections::HashMap;

use lagwatch_common::labels::{label_set, LabelSet};
use lagwatch_common::lag::LagSample;
use lagwatch_common::snapshot::Snapshot;
use lagwatch_common::status::{ConnectorState, Reachability};

use crate::condition::{Condition, ConditionKind};
use crate::history::SlotHistory;

/// Raw predicate result for one (condition, entity) pair at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateOutcome {
    pub condition: String,
    pub labels: LabelSet,
    pub met: bool,
    pub value: f64,
}

/// Evaluates every condition against the current snapshot and the retained
/// lag histories. Stateless beyond the bounded per-slot sample history kept
/// for growth-rate lookback.
pub struct Detector {
    max_lookback_ms: i64,
    histories: HashMap<String, SlotHistory>,
}

impl Detector {
    pub fn new(max_lookback_ms: i64) -> Self {
        Self {
            max_lookback_ms,
            histories: HashMap::new(),
        }
    }

    /// Feeds one lag sample in; returns false if the sample was discarded
    /// by the monotonic-timestamp guard.
    pub fn ingest(&mut self, sample: LagSample) -> bool {
        let history = self
            .histories
            .entry(sample.slot.clone())
            .or_insert_with(|| SlotHistory::new(self.max_lookback_ms));
        history.push(sample)
    }

    pub fn evaluate(
        &mut self,
        conditions: &[Condition],
        snapshot: &Snapshot,
        now_ms: i64,
    ) -> Vec<PredicateOutcome> {
        self.prune(now_ms);

        let mut outcomes = Vec::new();
        for condition in conditions {
            match &condition.kind {
                ConditionKind::LagAbove { threshold_bytes } => {
                    for (slot, history) in &self.histories {
                        let Some(latest) = history.latest() else { continue };
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([("slot", slot)]),
                            met: latest.lag_bytes > *threshold_bytes,
                            value: latest.lag_bytes as f64,
                        });
                    }
                }
                ConditionKind::InactiveWithLag { min_lag_bytes } => {
                    for (slot, history) in &self.histories {
                        let Some(latest) = history.latest() else { continue };
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([("slot", slot)]),
                            met: !latest.active && latest.lag_bytes > *min_lag_bytes,
                            value: latest.lag_bytes as f64,
                        });
                    }
                }
                ConditionKind::LagGrowth {
                    window_seconds,
                    delta_bytes,
                } => {
                    let boundary = now_ms - *window_seconds as i64 * 1000;
                    for (slot, history) in &self.histories {
                        let Some(latest) = history.latest() else { continue };
                        // Ineligible until retained history spans the full
                        // window; a missing lookback sample is predicate
                        // false, never a spurious fire.
                        let (met, growth) = match history.at_or_before(boundary) {
                            Some(past) => {
                                let growth =
                                    latest.lag_bytes as i64 - past.lag_bytes as i64;
                                (growth > *delta_bytes as i64 && !latest.active, growth)
                            }
                            None => (false, 0),
                        };
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([("slot", slot)]),
                            met,
                            value: growth as f64,
                        });
                    }
                }
                ConditionKind::ConnectorFailed => {
                    for status in snapshot.connectors() {
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([
                                ("endpoint", &status.endpoint),
                                ("connector", &status.connector),
                            ]),
                            met: status.state == ConnectorState::Failed,
                            value: (status.state == ConnectorState::Failed) as u8 as f64,
                        });
                    }
                }
                ConditionKind::TaskFailed => {
                    for status in snapshot.tasks() {
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([
                                ("endpoint", &status.endpoint),
                                ("connector", &status.connector),
                                ("task", &status.task.to_string()),
                            ]),
                            met: status.state == ConnectorState::Failed,
                            value: (status.state == ConnectorState::Failed) as u8 as f64,
                        });
                    }
                }
                ConditionKind::EndpointUnreachable => {
                    for entry in snapshot.endpoints.values() {
                        let down = entry.reachability == Reachability::Unreachable;
                        outcomes.push(PredicateOutcome {
                            condition: condition.name.clone(),
                            labels: label_set([("endpoint", &entry.endpoint)]),
                            met: down,
                            value: down as u8 as f64,
                        });
                    }
                }
            }
        }
        outcomes
    }

    pub fn slot_count(&self) -> usize {
        self.histories.len()
    }

    fn prune(&mut self, now_ms: i64) {
        for history in self.histories.values_mut() {
            history.evict(now_ms);
        }
        self.histories.retain(|_, h| !h.is_empty());
    }
}
