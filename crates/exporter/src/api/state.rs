use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::mpsc;

use lagwatch_common::lag::LagSample;

use crate::metrics::exporter_metrics::ExporterMetrics;
use crate::registry::Registry;
use crate::snapshot::SnapshotStore;

#[derive(Clone)]
pub struct ApiState {
    pub snapshots: Arc<SnapshotStore>,
    pub metrics: Arc<ExporterMetrics>,
    pub registry: Arc<Registry>,
    pub lag_tx: mpsc::Sender<LagSample>,
    /// Flips true after the first completed poll cycle.
    pub ready: Arc<AtomicBool>,
}
