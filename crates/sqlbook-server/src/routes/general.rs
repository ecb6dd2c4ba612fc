//! Cross-session saved-query store routes.

use super::sessions::UpdateRequest;
use super::{error_response, AppendRequest, ContentResponse, EntryQuery, SuccessResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use sqlbook_types::{EntryKind, TranscriptView, GENERAL_STORE_ID};
use std::sync::Arc;

pub async fn get(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContentResponse>, (StatusCode, String)> {
    let content = state
        .store
        .read_or_empty(GENERAL_STORE_ID)
        .map_err(error_response)?;
    Ok(Json(ContentResponse {
        content,
        database: None,
    }))
}

pub async fn view(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TranscriptView>, (StatusCode, String)> {
    let view = state.store.view(GENERAL_STORE_ID).map_err(error_response)?;
    Ok(Json(view))
}

pub async fn append(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AppendRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    let (kind, content) = req.parts(EntryKind::SavedQuery)?;
    state
        .store
        .append_general(kind, content, req.name.as_deref())
        .map_err(error_response)?;
    Ok(SuccessResponse::ok())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    let (index, update) = req
        .entry_update()
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Index is required".to_string()))??;
    state
        .store
        .update_entry(GENERAL_STORE_ID, index, &update)
        .map_err(error_response)?;
    Ok(SuccessResponse::ok())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    let index = query
        .index()?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Index is required".to_string()))?;
    state
        .store
        .delete_entry(GENERAL_STORE_ID, index, query.revision.as_deref())
        .map_err(error_response)?;
    Ok(SuccessResponse::ok())
}
