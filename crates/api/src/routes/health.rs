use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use watchgate_core::types::Timestamp;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether a media server URL and token are configured.
    pub media_server_configured: bool,
    /// When the last webhook arrived, if any since startup.
    pub last_webhook_at: Option<Timestamp>,
}

/// GET /health -- returns service, database and webhook health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = watchgate_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        media_server_configured: state.media_server_configured(),
        last_webhook_at: state.monitor.last_received(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
