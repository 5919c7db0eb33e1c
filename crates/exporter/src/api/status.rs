use axum::extract::State;
use axum::Json;
use serde::Serialize;

use lagwatch_common::status::Reachability;

use super::state::ApiState;

#[derive(Serialize)]
pub struct EndpointStatus {
    pub id: String,
    pub url: String,
    pub reachability: Reachability,
    pub last_polled_ms: Option<i64>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub endpoints: Vec<EndpointStatus>,
}

/// Operator view of the target set and what the last cycle saw.
pub async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let snapshot = state.snapshots.load();
    let endpoints = state
        .registry
        .current_targets()
        .iter()
        .map(|endpoint| EndpointStatus {
            id: endpoint.id.clone(),
            url: endpoint.base_url.clone(),
            reachability: state.registry.reachability(&endpoint.id),
            last_polled_ms: snapshot.get(&endpoint.id).map(|e| e.polled_at_ms),
        })
        .collect();
    Json(StatusResponse { endpoints })
}
