use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

use lagwatch_alert::detector::Detector;
use lagwatch_alert::engine::AlertEngine;
use lagwatch_alert::event::AlertStatus;
use lagwatch_alert::router::{AlertRouter, WebhookDispatcher};
use lagwatch_common::lag::LagSample;
use lagwatch_common::snapshot::EndpointSnapshot;
use lagwatch_common::status::Reachability;
use lagwatch_common::time::now_ms;

use crate::api::{self, state::ApiState};
use crate::config::ExporterConfig;
use crate::metrics::exporter_metrics::ExporterMetrics;
use crate::normalizer::normalize;
use crate::poller::Poller;
use crate::registry::Registry;
use crate::snapshot::SnapshotStore;

const LAG_QUEUE_DEPTH: usize = 1024;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub async fn run(
    config: ExporterConfig,
    config_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let urls = config.endpoints.urls();
    tracing::info!(
        endpoints = urls.len(),
        bind_addr = %config.bind_addr,
        poll_interval_s = config.poll_interval_seconds,
        eval_interval_s = config.eval_interval_seconds,
        conditions = config.conditions.len(),
        "exporter configured"
    );

    let registry = Arc::new(Registry::new(&urls));
    let snapshots = Arc::new(SnapshotStore::new());
    let metrics = ExporterMetrics::new();
    let ready = Arc::new(AtomicBool::new(false));
    let (lag_tx, lag_rx) = mpsc::channel(LAG_QUEUE_DEPTH);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = Poller::new(
        Duration::from_secs(config.request_timeout_seconds),
        config.max_concurrent_polls,
    )?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()?;
    let dispatcher = WebhookDispatcher::new(config.router.url.clone(), http);

    let detector = Detector::new(config.max_lookback_seconds as i64 * 1000);
    let engine = AlertEngine::new(
        config.conditions.clone(),
        config.resolved_retention_seconds as i64 * 1000,
    );
    let router = AlertRouter::new(dispatcher, config.conditions.clone(), config.inhibit.clone());

    let poll_task = spawn_poll_loop(
        poller,
        registry.clone(),
        snapshots.clone(),
        metrics.clone(),
        ready.clone(),
        Duration::from_secs(config.poll_interval_seconds),
        shutdown_rx.clone(),
    );
    let eval_task = spawn_eval_loop(
        detector,
        engine,
        router,
        lag_rx,
        snapshots.clone(),
        metrics.clone(),
        Duration::from_secs(config.eval_interval_seconds),
        shutdown_rx,
    );

    let api_state = ApiState {
        snapshots,
        metrics,
        registry: registry.clone(),
        lag_tx,
        ready,
    };
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "HTTP API listening");
    tokio::spawn(async move {
        if let Err(e) = api::server::serve(listener, api_state).await {
            tracing::error!(error = %e, "HTTP API error");
        }
    });

    #[cfg(unix)]
    spawn_reload(config_path, registry);
    #[cfg(not(unix))]
    let _ = config_path;

    crate::shutdown::wait_for_shutdown().await;

    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, async {
        let _ = poll_task.await;
        let _ = eval_task.await;
    })
    .await;

    Ok(())
}

fn spawn_poll_loop(
    poller: Poller,
    registry: Arc<Registry>,
    snapshots: Arc<SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
    ready: Arc<AtomicBool>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let targets = registry.current_targets();
            let results = poller.poll_once(&targets).await;
            let now = now_ms();

            let mut updates = Vec::with_capacity(results.len());
            let mut failures = 0u64;
            for (endpoint, result) in results {
                match result {
                    Ok(raw) => {
                        if registry.reachability(&endpoint.id) != Reachability::Reachable {
                            tracing::info!(endpoint = %endpoint.id, "endpoint reachable");
                        }
                        registry.mark(&endpoint.id, Reachability::Reachable);
                        updates.push(normalize(&endpoint.id, &raw, now));
                    }
                    Err(e) => {
                        failures += 1;
                        if registry.reachability(&endpoint.id) != Reachability::Unreachable {
                            tracing::warn!(endpoint = %endpoint.id, error = %e, "endpoint unreachable");
                        }
                        registry.mark(&endpoint.id, Reachability::Unreachable);
                        updates.push(EndpointSnapshot::unreachable(&endpoint.id, now));
                    }
                }
            }

            // Registered ids are re-read after the poll so a concurrent
            // reload drops results for removed endpoints.
            let registered: Vec<String> = registry
                .current_targets()
                .iter()
                .map(|e| e.id.clone())
                .collect();
            snapshots.publish_cycle(updates, &registered);

            metrics.inc_poll_cycles();
            metrics.add_poll_failures(failures);
            ready.store(true, Ordering::Relaxed);
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn spawn_eval_loop(
    mut detector: Detector,
    mut engine: AlertEngine,
    mut router: AlertRouter<WebhookDispatcher>,
    mut lag_rx: mpsc::Receiver<LagSample>,
    snapshots: Arc<SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            metrics.inc_evaluation_ticks();

            while let Ok(sample) = lag_rx.try_recv() {
                if !detector.ingest(sample) {
                    metrics.inc_lag_samples_discarded();
                }
            }

            let snapshot = snapshots.load();
            let now = now_ms();
            let outcomes = detector.evaluate(engine.conditions(), &snapshot, now);
            let events = engine.step(&outcomes, now);

            let fired = events
                .iter()
                .filter(|e| e.status == AlertStatus::Firing)
                .count() as u64;
            let resolved = events
                .iter()
                .filter(|e| e.status == AlertStatus::Resolved)
                .count() as u64;
            metrics.add_alerts_fired(fired);
            metrics.add_alerts_resolved(resolved);

            router.enqueue(events, now);
            let firing = engine.firing();
            let report = router.flush(&firing, now).await;

            metrics.add_notifications_sent(report.dispatched.len() as u64);
            metrics.add_notifications_failed(report.failed_batches as u64);
            metrics.add_notifications_suppressed(report.suppressed as u64);
            engine.mark_notified(&report.dispatched, now);
        }
    })
}

/// SIGHUP re-reads the config file and swaps the endpoint set. Everything
/// else (intervals, conditions, router) requires a restart.
#[cfg(unix)]
fn spawn_reload(config_path: PathBuf, registry: Arc<Registry>) {
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        let mut hup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "SIGHUP handler unavailable, reload disabled");
                return;
            }
        };
        while hup.recv().await.is_some() {
            match crate::config::load_from_file(&config_path) {
                Ok(cfg) => {
                    let urls = cfg.endpoints.urls();
                    registry.reload(&urls);
                    tracing::info!(endpoints = urls.len(), "endpoint set reloaded");
                }
                Err(e) => {
                    tracing::error!(error = %e, "config reload failed, keeping current endpoints");
                }
            }
        }
    });
}
