//! Read-only passthrough to the media server directories.

use axum::extract::State;
use axum::Json;
use watchgate_plex::{LibrarySection, PlaybackSession};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/media/libraries
pub async fn libraries(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<LibrarySection>>>> {
    let sections = state.media.library_sections().await?;
    Ok(Json(DataResponse { data: sections }))
}

/// GET /api/v1/media/sessions
pub async fn sessions(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<PlaybackSession>>>> {
    let sessions = state.media.sessions().await?;
    Ok(Json(DataResponse { data: sessions }))
}
