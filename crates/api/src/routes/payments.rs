use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Payment ledger routes mounted at `/payments`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(payments::create))
        .route("/total", get(payments::total))
        .route("/leaderboard", get(payments::leaderboard))
}
