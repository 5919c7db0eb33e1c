use std::sync::Mutex;

use lagwatch_common::lag::LagSample;
use lagwatch_common::snapshot::Snapshot;

use crate::condition::Condition;
use crate::detector::Detector;
use crate::engine::AlertEngine;
use crate::event::{AlertEvent, AlertStatus};
use crate::inhibit::InhibitRule;
use crate::router::{AlertRouter, DispatchError, Dispatcher};

/// One step of a scripted scenario: samples and a snapshot observed at a
/// virtual timestamp, after which a full evaluation tick runs.
pub struct Tick {
    pub at_ms: i64,
    pub lag_samples: Vec<LagSample>,
    pub snapshot: Snapshot,
}

pub struct HarnessResult {
    pub dispatched: Vec<AlertEvent>,
    pub suppressed: usize,
}

impl HarnessResult {
    pub fn firing(&self) -> Vec<&AlertEvent> {
        self.dispatched
            .iter()
            .filter(|e| e.status == AlertStatus::Firing)
            .collect()
    }

    pub fn resolved(&self) -> Vec<&AlertEvent> {
        self.dispatched
            .iter()
            .filter(|e| e.status == AlertStatus::Resolved)
            .collect()
    }
}

#[derive(Default)]
pub struct CollectingDispatcher {
    pub batches: Mutex<Vec<Vec<AlertEvent>>>,
}

#[async_trait::async_trait]
impl Dispatcher for CollectingDispatcher {
    async fn dispatch(&self, events: &[AlertEvent]) -> Result<(), DispatchError> {
        self.batches
            .lock()
            .map_err(|e| DispatchError(e.to_string()))?
            .push(events.to_vec());
        Ok(())
    }
}

/// Drives detector, engine and router over scripted ticks exactly the way
/// the evaluation loop does, collecting every dispatched event.
pub async fn run_scenario(
    conditions: Vec<Condition>,
    inhibit: Vec<InhibitRule>,
    retention_ms: i64,
    max_lookback_ms: i64,
    ticks: Vec<Tick>,
) -> HarnessResult {
    let mut detector = Detector::new(max_lookback_ms);
    let mut engine = AlertEngine::new(conditions.clone(), retention_ms);
    let mut router = AlertRouter::new(CollectingDispatcher::default(), conditions, inhibit);
    let mut suppressed = 0;

    for tick in ticks {
        for sample in tick.lag_samples {
            detector.ingest(sample);
        }
        let outcomes = detector.evaluate(engine.conditions(), &tick.snapshot, tick.at_ms);
        let events = engine.step(&outcomes, tick.at_ms);
        router.enqueue(events, tick.at_ms);
        let report = router.flush(&engine.firing(), tick.at_ms).await;
        engine.mark_notified(&report.dispatched, tick.at_ms);
        suppressed += report.suppressed;
    }

    let dispatched = router
        .dispatcher()
        .batches
        .lock()
        .map(|b| b.iter().flatten().cloned().collect())
        .unwrap_or_default();
    HarnessResult {
        dispatched,
        suppressed,
    }
}
