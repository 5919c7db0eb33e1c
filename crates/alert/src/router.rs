use std::collections::{BTreeMap, HashMap};

use reqwest::Client;

use crate::condition::Condition;
use crate::engine::FiringAlert;
use crate::event::AlertEvent;
use crate::inhibit::{is_inhibited, InhibitRule};

#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, events: &[AlertEvent]) -> Result<(), DispatchError>;
}

#[derive(Debug)]
pub struct DispatchError(pub String);

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispatch: {}", self.0)
    }
}

impl std::error::Error for DispatchError {}

/// POSTs event batches to the external alert router. At-least-once:
/// a failed batch stays pending and is re-sent on a later flush.
pub struct WebhookDispatcher {
    url: String,
    client: Client,
}

impl WebhookDispatcher {
    pub fn new(url: String, client: Client) -> Self {
        Self { url, client }
    }
}

#[async_trait::async_trait]
impl Dispatcher for WebhookDispatcher {
    async fn dispatch(&self, events: &[AlertEvent]) -> Result<(), DispatchError> {
        self.client
            .post(&self.url)
            .json(events)
            .send()
            .await
            .map_err(|e| DispatchError(e.to_string()))?
            .error_for_status()
            .map_err(|e| DispatchError(e.to_string()))?;
        Ok(())
    }
}

struct PendingGroup {
    since_ms: i64,
    events: BTreeMap<String, AlertEvent>,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub dispatched: Vec<String>,
    pub failed_batches: usize,
    pub suppressed: usize,
}

/// Groups due events per condition, applies inhibition at dispatch time,
/// and hands batches to the dispatcher. Events are deduplicated by
/// fingerprint so re-emitted due events never pile up.
pub struct AlertRouter<D> {
    dispatcher: D,
    conditions: Vec<Condition>,
    rules: Vec<InhibitRule>,
    pending: HashMap<String, PendingGroup>,
}

impl<D: Dispatcher> AlertRouter<D> {
    pub fn new(dispatcher: D, conditions: Vec<Condition>, rules: Vec<InhibitRule>) -> Self {
        Self {
            dispatcher,
            conditions,
            rules,
            pending: HashMap::new(),
        }
    }

    pub fn enqueue(&mut self, events: Vec<AlertEvent>, now_ms: i64) {
        for event in events {
            let group = self
                .pending
                .entry(event.condition.clone())
                .or_insert_with(|| PendingGroup {
                    since_ms: now_ms,
                    events: BTreeMap::new(),
                });
            group.events.insert(event.fingerprint.clone(), event);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(|g| g.events.len()).sum()
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub async fn flush(&mut self, firing: &[FiringAlert], now_ms: i64) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (name, group) in self.pending.iter_mut() {
            let Some(condition) = self.conditions.iter().find(|c| &c.name == name) else {
                group.events.clear();
                continue;
            };
            if now_ms - group.since_ms < condition.group_wait_ms() {
                continue;
            }

            let (batch, held): (Vec<_>, Vec<_>) = std::mem::take(&mut group.events)
                .into_values()
                .partition(|e| !is_inhibited(e, &self.rules, firing));
            report.suppressed += held.len();
            // Suppressed events stay pending; once the inhibitor resolves
            // they go out on a later flush.
            for event in held {
                group.events.insert(event.fingerprint.clone(), event);
            }

            if batch.is_empty() {
                continue;
            }
            match self.dispatcher.dispatch(&batch).await {
                Ok(()) => {
                    tracing::info!(
                        condition = %name,
                        events = batch.len(),
                        "alert batch dispatched"
                    );
                    report
                        .dispatched
                        .extend(batch.iter().map(|e| e.fingerprint.clone()));
                }
                Err(e) => {
                    tracing::warn!(condition = %name, error = %e, "alert dispatch failed, will retry");
                    report.failed_batches += 1;
                    for event in batch {
                        group.events.insert(event.fingerprint.clone(), event);
                    }
                }
            }
        }

        self.pending.retain(|_, g| !g.events.is_empty());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;
    use crate::event::AlertStatus;
    use crate::inhibit::Matcher;
    use lagwatch_common::labels::label_set;
    use lagwatch_common::severity::Severity;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct RecordingDispatcher {
        fail: AtomicBool,
        batches: Mutex<Vec<Vec<AlertEvent>>>,
    }

    impl RecordingDispatcher {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Dispatcher for RecordingDispatcher {
        async fn dispatch(&self, events: &[AlertEvent]) -> Result<(), DispatchError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DispatchError("router unavailable".into()));
            }
            self.batches.lock().unwrap().push(events.to_vec());
            Ok(())
        }
    }

    fn condition(name: &str, group_wait_seconds: u64) -> Condition {
        Condition {
            name: name.into(),
            kind: ConditionKind::ConnectorFailed,
            severity: Severity::Warning,
            for_seconds: 0,
            group_wait_seconds,
            repeat_interval_seconds: 300,
        }
    }

    fn event(condition: &str, entity: &str) -> AlertEvent {
        AlertEvent {
            id: uuid::Uuid::new_v4().to_string(),
            fingerprint: format!("fp-{condition}-{entity}"),
            condition: condition.into(),
            severity: Severity::Warning,
            status: AlertStatus::Firing,
            labels: label_set([("endpoint", "c1"), ("connector", entity)]),
            value: 1.0,
            started_at_ms: 0,
            resolved_at_ms: None,
        }
    }

    #[tokio::test]
    async fn batches_after_group_wait() {
        let mut router = AlertRouter::new(
            RecordingDispatcher::new(),
            vec![condition("connector_failed", 10)],
            vec![],
        );
        router.enqueue(vec![event("connector_failed", "orders")], 0);
        router.enqueue(vec![event("connector_failed", "billing")], 2000);

        // Group wait not elapsed yet.
        let report = router.flush(&[], 5000).await;
        assert!(report.dispatched.is_empty());

        let report = router.flush(&[], 10_000).await;
        assert_eq!(report.dispatched.len(), 2);
        let batches = router.dispatcher.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[tokio::test]
    async fn dedupes_reemitted_events_by_fingerprint() {
        let mut router = AlertRouter::new(
            RecordingDispatcher::new(),
            vec![condition("connector_failed", 5)],
            vec![],
        );
        router.enqueue(vec![event("connector_failed", "orders")], 0);
        router.enqueue(vec![event("connector_failed", "orders")], 1000);
        assert_eq!(router.pending_count(), 1);

        let report = router.flush(&[], 6000).await;
        assert_eq!(report.dispatched.len(), 1);
    }

    #[tokio::test]
    async fn failed_dispatch_retries_on_next_flush() {
        let mut router = AlertRouter::new(
            RecordingDispatcher::new(),
            vec![condition("connector_failed", 0)],
            vec![],
        );
        router.dispatcher.fail.store(true, Ordering::SeqCst);
        router.enqueue(vec![event("connector_failed", "orders")], 0);

        let report = router.flush(&[], 1000).await;
        assert_eq!(report.failed_batches, 1);
        assert!(report.dispatched.is_empty());
        assert_eq!(router.pending_count(), 1);

        router.dispatcher.fail.store(false, Ordering::SeqCst);
        let report = router.flush(&[], 2000).await;
        assert_eq!(report.dispatched.len(), 1);
        assert_eq!(router.pending_count(), 0);
    }

    #[tokio::test]
    async fn inhibited_events_held_until_source_resolves() {
        let rule = InhibitRule {
            source: Matcher {
                condition: Some("endpoint_unreachable".into()),
                severity: None,
            },
            target: Matcher {
                condition: Some("connector_failed".into()),
                severity: None,
            },
            equal: vec!["endpoint".into()],
        };
        let mut router = AlertRouter::new(
            RecordingDispatcher::new(),
            vec![condition("connector_failed", 0)],
            vec![rule],
        );
        router.enqueue(vec![event("connector_failed", "orders")], 0);

        let source = FiringAlert {
            fingerprint: "fp-down-c1".into(),
            condition: "endpoint_unreachable".into(),
            severity: Severity::Critical,
            labels: label_set([("endpoint", "c1")]),
        };
        let report = router.flush(&[source], 1000).await;
        assert_eq!(report.suppressed, 1);
        assert!(report.dispatched.is_empty());
        assert_eq!(router.pending_count(), 1);

        // Inhibitor resolved: next flush dispatches.
        let report = router.flush(&[], 2000).await;
        assert_eq!(report.dispatched.len(), 1);
    }

    #[tokio::test]
    async fn unknown_condition_dropped() {
        let mut router = AlertRouter::new(RecordingDispatcher::new(), vec![], vec![]);
        router.enqueue(vec![event("ghost", "orders")], 0);
        router.flush(&[], 1000).await;
        assert_eq!(router.pending_count(), 0);
    }
}
