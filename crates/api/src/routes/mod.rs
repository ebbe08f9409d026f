pub mod health;
pub mod media;
pub mod payments;
pub mod ransoms;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ransoms                  create
/// /ransoms/active           list active
/// /ransoms/unlocked         list unlocked (newest first)
/// /ransoms/popular          most used prerequisites (?limit=N)
/// /ransoms/{id}             get, delete
///
/// /payments                 record a payment
/// /payments/total           sum of all payments
/// /payments/leaderboard     total paid per subject
///
/// /media/libraries          media server library sections
/// /media/sessions           live playback sessions
///
/// /webhook/test             record a synthetic webhook
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/ransoms", ransoms::router())
        .nest("/payments", payments::router())
        .nest("/media", media::router())
        .nest("/webhook", webhook::api_router())
}
