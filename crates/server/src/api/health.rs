use axum::extract::State;
use axum::Json;

use super::schemas::HealthResponse;
use super::AppState;

/// `GET /health`: liveness plus a snapshot of the request counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        metrics: state.metrics.snapshot(),
    })
}
