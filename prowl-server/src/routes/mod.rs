use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::sweep;
use crate::infra::app_state::AppState;

/// Assemble the `/api` control surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/start", post(sweep::start_sweep_handler))
        .route("/api/stop", post(sweep::stop_sweep_handler))
        .route("/api/logs", get(sweep::logs_handler))
        .with_state(state)
}
