//! Handlers for the sweep control endpoints.

use axum::{Json, extract::State};

use crate::api::{CommandResponse, LogsResponse, StartRequest};
use crate::errors::AppResult;
use crate::infra::app_state::AppState;

/// `POST /api/start` — launch a sweep job.
///
/// Returns immediately once the run loop is spawned; a job already in
/// flight yields 409 with `task already running`.
pub async fn start_sweep_handler(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> AppResult<Json<CommandResponse>> {
    state.controller.start(request.into()).await?;
    Ok(Json(CommandResponse::success("task started")))
}

/// `POST /api/stop` — request cancellation.
///
/// Always succeeds, including when no job is active. Stopping is
/// acknowledged, not confirmed: callers poll `/api/logs` until `running`
/// turns false.
pub async fn stop_sweep_handler(
    State(state): State<AppState>,
) -> Json<CommandResponse> {
    state.controller.stop().await;
    Json(CommandResponse::success("stopping"))
}

/// `GET /api/logs` — poll the running flag and formatted progress lines.
pub async fn logs_handler(State(state): State<AppState>) -> Json<LogsResponse> {
    let snapshot = state.controller.poll().await;
    Json(LogsResponse {
        running: snapshot.running,
        logs: snapshot.entries.iter().map(|entry| entry.formatted()).collect(),
    })
}
