use axum::routing::get;
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Media server passthrough routes mounted at `/media`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/libraries", get(media::libraries))
        .route("/sessions", get(media::sessions))
}
