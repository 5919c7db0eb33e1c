use std::collections::{HashMap, HashSet};

use lagwatch_common::labels::{fingerprint_string, LabelSet};
use lagwatch_common::severity::Severity;

use crate::condition::Condition;
use crate::detector::PredicateOutcome;
use crate::event::{AlertEvent, AlertStatus};
use crate::state::AlertState;

/// A currently-firing instance, as seen by inhibition matching.
#[derive(Debug, Clone)]
pub struct FiringAlert {
    pub fingerprint: String,
    pub condition: String,
    pub severity: Severity,
    pub labels: LabelSet,
}

struct Instance {
    condition: usize,
    labels: LabelSet,
    state: AlertState,
    last_value: f64,
    last_notified_ms: Option<i64>,
}

/// Owns all alert state. The detector supplies predicate outcomes each
/// tick; nothing else mutates instances. Emits events that are currently
/// due: entry into firing, repeat-interval re-notifications, and one
/// resolution per firing episode. `last_notified` only advances through
/// `mark_notified`, so a failed or suppressed dispatch is naturally
/// retried on a later tick.
pub struct AlertEngine {
    conditions: Vec<Condition>,
    retention_ms: i64,
    instances: HashMap<String, Instance>,
}

impl AlertEngine {
    pub fn new(conditions: Vec<Condition>, retention_ms: i64) -> Self {
        Self {
            conditions,
            retention_ms,
            instances: HashMap::new(),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn step(&mut self, outcomes: &[PredicateOutcome], now_ms: i64) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        let mut seen = HashSet::new();

        for outcome in outcomes {
            let Some(idx) = self
                .conditions
                .iter()
                .position(|c| c.name == outcome.condition)
            else {
                continue;
            };
            let fp = fingerprint_string(&outcome.condition, &outcome.labels);
            seen.insert(fp.clone());

            if !self.instances.contains_key(&fp) {
                // Instances are created on first predicate match only.
                if !outcome.met {
                    continue;
                }
                self.instances.insert(
                    fp.clone(),
                    Instance {
                        condition: idx,
                        labels: outcome.labels.clone(),
                        state: AlertState::Inactive,
                        last_value: 0.0,
                        last_notified_ms: None,
                    },
                );
            }
            let Some(instance) = self.instances.get_mut(&fp) else {
                continue;
            };
            instance.last_value = outcome.value;
            Self::advance(
                &self.conditions[idx],
                self.retention_ms,
                &fp,
                instance,
                outcome.met,
                now_ms,
                &mut events,
            );
        }

        // An entity that produced no outcome this tick (removed connector,
        // evicted slot) is treated as predicate-false so its alert resolves.
        let absent: Vec<String> = self
            .instances
            .keys()
            .filter(|fp| !seen.contains(*fp))
            .cloned()
            .collect();
        for fp in absent {
            let Some(instance) = self.instances.get_mut(&fp) else {
                continue;
            };
            let condition = &self.conditions[instance.condition];
            Self::advance(
                condition,
                self.retention_ms,
                &fp,
                instance,
                false,
                now_ms,
                &mut events,
            );
        }

        self.instances.retain(|_, i| !i.state.is_inactive());
        events
    }

    /// Records a successful dispatch for the given fingerprints.
    pub fn mark_notified(&mut self, fingerprints: &[String], now_ms: i64) {
        for fp in fingerprints {
            if let Some(instance) = self.instances.get_mut(fp) {
                instance.last_notified_ms = Some(now_ms);
            }
        }
    }

    pub fn firing(&self) -> Vec<FiringAlert> {
        self.instances
            .iter()
            .filter(|(_, i)| i.state.is_firing())
            .map(|(fp, i)| FiringAlert {
                fingerprint: fp.clone(),
                condition: self.conditions[i.condition].name.clone(),
                severity: self.conditions[i.condition].severity,
                labels: i.labels.clone(),
            })
            .collect()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn advance(
        condition: &Condition,
        retention_ms: i64,
        fp: &str,
        instance: &mut Instance,
        met: bool,
        now_ms: i64,
        events: &mut Vec<AlertEvent>,
    ) {
        let prev = instance.state;
        instance.state = prev.transition(met, now_ms, condition.for_ms(), retention_ms);

        match instance.state {
            AlertState::Firing { since_ms } => {
                let due = match instance.last_notified_ms {
                    None => true,
                    Some(t) => now_ms - t >= condition.repeat_interval_ms(),
                };
                if !prev.is_firing() || due {
                    events.push(Self::event(
                        condition,
                        fp,
                        instance,
                        AlertStatus::Firing,
                        since_ms,
                        None,
                    ));
                }
            }
            AlertState::Resolved { at_ms } if prev.is_firing() => {
                let started = match prev {
                    AlertState::Firing { since_ms } => since_ms,
                    _ => at_ms,
                };
                events.push(Self::event(
                    condition,
                    fp,
                    instance,
                    AlertStatus::Resolved,
                    started,
                    Some(at_ms),
                ));
            }
            _ => {}
        }
    }

    fn event(
        condition: &Condition,
        fp: &str,
        instance: &Instance,
        status: AlertStatus,
        started_at_ms: i64,
        resolved_at_ms: Option<i64>,
    ) -> AlertEvent {
        AlertEvent {
            id: uuid::Uuid::new_v4().to_string(),
            fingerprint: fp.to_string(),
            condition: condition.name.clone(),
            severity: condition.severity,
            status,
            labels: instance.labels.clone(),
            value: instance.last_value,
            started_at_ms,
            resolved_at_ms,
        }
    }
}
