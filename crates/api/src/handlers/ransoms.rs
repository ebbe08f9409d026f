//! Handlers for the `/ransoms` resource.
//!
//! All writes go through the [`RansomStore`](watchgate_engine::RansomStore)
//! shared with the event processor, so the one-active-ransom-per-subject rule
//! is enforced in a single place.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use watchgate_core::error::CoreError;
use watchgate_core::types::DbId;
use watchgate_db::models::ransom::{CreateRansom, PrerequisiteUsage, Ransom};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of entries returned by the popularity ranking.
pub const DEFAULT_POPULAR_LIMIT: i64 = 5;
const MAX_POPULAR_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub limit: Option<i64>,
}

/// POST /api/v1/ransoms
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRansom>,
) -> AppResult<(StatusCode, Json<DataResponse<Ransom>>)> {
    let input = input.normalized();
    input.validate()?;

    let ransom = state.store.create_ransom(&input).await?;

    // Soft lock: the collection stays visible, its streams get terminated.
    tracing::info!(
        ransom_id = ransom.id,
        subject = %ransom.subject,
        prerequisite = %ransom.prerequisite,
        threshold = ransom.threshold,
        locked = %ransom.locked_collection,
        issued_by = ?ransom.issued_by,
        "Ransom created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ransom })))
}

/// GET /api/v1/ransoms/active
pub async fn list_active(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Ransom>>>> {
    let ransoms = state.store.list_active().await?;
    Ok(Json(DataResponse { data: ransoms }))
}

/// GET /api/v1/ransoms/unlocked
///
/// Most recently unlocked first.
pub async fn list_unlocked(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Ransom>>>> {
    let ransoms = state.store.list_unlocked().await?;
    Ok(Json(DataResponse { data: ransoms }))
}

/// GET /api/v1/ransoms/popular?limit=N
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> AppResult<Json<DataResponse<Vec<PrerequisiteUsage>>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);
    let ranking = state.store.most_used_prerequisites(limit).await?;
    Ok(Json(DataResponse { data: ranking }))
}

/// GET /api/v1/ransoms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ransom>>> {
    let ransom = state
        .store
        .find_ransom(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ransom",
            id,
        }))?;
    Ok(Json(DataResponse { data: ransom }))
}

/// DELETE /api/v1/ransoms/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if state.store.delete_ransom(id).await? {
        tracing::info!(ransom_id = id, "Ransom deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Ransom",
            id,
        }))
    }
}
