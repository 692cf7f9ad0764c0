//! # Prowl Server
//!
//! HTTP control surface for the single-job sweep runner.
//!
//! Three endpoints drive the whole service:
//!
//! - `POST /api/start` — launch a sweep job (fire-and-forget)
//! - `POST /api/stop` — request cooperative cancellation
//! - `GET /api/logs` — poll the running flag and the progress log
//!
//! All state is process-lifetime only; a restart starts from scratch.

pub mod api;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
