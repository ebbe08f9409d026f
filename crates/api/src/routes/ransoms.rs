use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ransoms;
use crate::state::AppState;

/// Ransom routes mounted at `/ransoms`.
///
/// ```text
/// POST   /            -> create
/// GET    /active      -> list_active
/// GET    /unlocked    -> list_unlocked
/// GET    /popular     -> popular
/// GET    /{id}        -> get_by_id
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(ransoms::create))
        .route("/active", get(ransoms::list_active))
        .route("/unlocked", get(ransoms::list_unlocked))
        .route("/popular", get(ransoms::popular))
        .route("/{id}", get(ransoms::get_by_id).delete(ransoms::delete))
}
