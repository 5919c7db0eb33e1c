use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use lagwatch_common::lag::LagSample;

use super::state::ApiState;

/// Accepts a batch of slot lag observations from the co-located collector.
/// Samples are queued for the next evaluation tick; a full queue drops the
/// rest of the batch rather than blocking the collector.
pub async fn ingest(
    State(state): State<ApiState>,
    Json(samples): Json<Vec<LagSample>>,
) -> StatusCode {
    for sample in samples {
        if state.lag_tx.try_send(sample).is_err() {
            tracing::warn!("lag ingestion queue full, dropping batch remainder");
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        state.metrics.inc_lag_samples();
    }
    StatusCode::ACCEPTED
}
