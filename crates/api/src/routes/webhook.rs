use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Webhook ingress at root level (`POST /webhook`), the URL registered with
/// the media server.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook::receive))
}

/// Operator routes mounted at `/api/v1/webhook`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/test", post(webhook::test))
}
