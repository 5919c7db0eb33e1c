use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use super::state::ApiState;
use super::{health, lag, metrics, status};

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::metrics))
        .route("/status", get(status::status))
        .route("/lag", post(lag::ingest))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: ApiState) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use lagwatch_common::lag::LagSample;
    use lagwatch_common::snapshot::EndpointSnapshot;

    use crate::metrics::exporter_metrics::ExporterMetrics;
    use crate::registry::Registry;
    use crate::snapshot::SnapshotStore;

    fn state() -> (ApiState, mpsc::Receiver<LagSample>) {
        let (lag_tx, lag_rx) = mpsc::channel(16);
        let state = ApiState {
            snapshots: Arc::new(SnapshotStore::new()),
            metrics: ExporterMetrics::new(),
            registry: Arc::new(Registry::new(&["http://c1:8083".into()])),
            lag_tx,
            ready: Arc::new(AtomicBool::new(false)),
        };
        (state, lag_rx)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_path(app: Router, uri: &str) -> (StatusCode, String) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn healthz_responds() {
        let (state, _rx) = state();
        let (status, body) = get_path(router(state), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn ready_gated_on_first_cycle() {
        let (state, _rx) = state();
        let ready = state.ready.clone();
        let app = router(state);

        let (status, _) = get_path(app.clone(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        ready.store(true, Ordering::Relaxed);
        let (status, _) = get_path(app, "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exposes_snapshot() {
        let (state, _rx) = state();
        state.snapshots.publish_cycle(
            vec![EndpointSnapshot::unreachable("c1:8083", 1000)],
            &["c1:8083".to_string()],
        );
        let (status, body) = get_path(router(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("kafka_connect_up{endpoint=\"c1:8083\"} 0"));
        assert!(body.contains("lagwatch_poll_cycles_total"));
    }

    #[tokio::test]
    async fn status_lists_targets() {
        let (state, _rx) = state();
        let (status, body) = get_path(router(state), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"id\":\"c1:8083\""));
        assert!(body.contains("\"reachability\":\"unknown\""));
        assert!(body.contains("\"last_polled_ms\":null"));
    }

    #[tokio::test]
    async fn lag_batch_queued() {
        let (state, mut rx) = state();
        let app = router(state);

        let body = r#"[
            {"slot":"debezium_orders","lag_bytes":1024,"active":true,"timestamp_ms":1000},
            {"slot":"debezium_audit","lag_bytes":0,"active":false,"timestamp_ms":1000}
        ]"#;
        let req = Request::post("/lag")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        assert_eq!(rx.recv().await.unwrap().slot, "debezium_orders");
        assert_eq!(rx.recv().await.unwrap().slot, "debezium_audit");
    }

    #[tokio::test]
    async fn lag_rejects_malformed_payload() {
        let (state, _rx) = state();
        let req = Request::post("/lag")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"not":"a list"}"#))
            .unwrap();
        let (status, _) = send(router(state), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn full_lag_queue_returns_unavailable() {
        let (lag_tx, _lag_rx) = mpsc::channel(1);
        let state = ApiState {
            snapshots: Arc::new(SnapshotStore::new()),
            metrics: ExporterMetrics::new(),
            registry: Arc::new(Registry::new(&[])),
            lag_tx,
            ready: Arc::new(AtomicBool::new(true)),
        };
        let body = r#"[
            {"slot":"a","lag_bytes":1,"active":true,"timestamp_ms":1},
            {"slot":"b","lag_bytes":1,"active":true,"timestamp_ms":1}
        ]"#;
        let req = Request::post("/lag")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, _) = send(router(state), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
