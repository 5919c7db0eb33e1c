use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::metrics::exposition::render_prometheus;

use super::state::ApiState;

pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.snapshots.load();
    let body = render_prometheus(&snapshot, &state.metrics);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
