//! Liveness probe

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Payload returned by `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: &'static str,
    /// Service identifier
    pub module: &'static str,
    /// Version baked in at build time
    pub version: &'static str,
    /// Whole seconds since startup
    pub uptime_seconds: u64,
}

/// GET /health - liveness probe reporting version and uptime
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = podium_common::time::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        module: "podium-pc",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
