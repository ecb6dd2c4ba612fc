//! Session transcript routes.

use super::{error_response, AppendRequest, ContentResponse, EntryQuery, SuccessResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlbook_core::EntryUpdate;
use sqlbook_types::{EntryKind, SessionSummary, TranscriptView};
use std::sync::Arc;
use tracing::info;

pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionSummary>>, (StatusCode, String)> {
    let sessions = state.store.list_sessions().map_err(error_response)?;
    Ok(Json(sessions))
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, (StatusCode, String)> {
    let name = req
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Name is required".to_string()))?;

    let id = state
        .store
        .create(name, req.database.as_deref())
        .map_err(error_response)?;

    info!(target: "sqlbook::api", "Created session {}", id);
    Ok(Json(CreateSessionResponse { id }))
}

/// Raw document text. Absent sessions read as empty content.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ContentResponse>, (StatusCode, String)> {
    let content = state.store.read_or_empty(&id).map_err(error_response)?;
    let database = state.store.session_database(&id).map_err(error_response)?;
    Ok(Json(ContentResponse {
        content,
        database: Some(database),
    }))
}

pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptView>, (StatusCode, String)> {
    let view = state.store.view(&id).map_err(error_response)?;
    Ok(Json(view))
}

#[derive(Serialize)]
pub struct DatabaseResponse {
    pub database: String,
}

pub async fn database(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DatabaseResponse>, (StatusCode, String)> {
    let database = state.store.session_database(&id).map_err(error_response)?;
    Ok(Json(DatabaseResponse { database }))
}

pub async fn append(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AppendRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    let (kind, content) = req.parts(EntryKind::Note)?;
    state
        .store
        .append(&id, kind, content, req.name.as_deref())
        .map_err(error_response)?;
    Ok(SuccessResponse::ok())
}

pub async fn page_break(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    state.store.insert_page_break(&id).map_err(error_response)?;
    Ok(SuccessResponse::ok())
}

/// Either a rename (`name` only) or an entry edit (`index` + `content`).
#[derive(Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

impl UpdateRequest {
    /// Entry edit described by this request, if it carries an index.
    pub fn entry_update(&self) -> Option<Result<(usize, EntryUpdate), (StatusCode, String)>> {
        let index = self.index?;
        let Some(content) = self.content.clone() else {
            return Some(Err((
                StatusCode::BAD_REQUEST,
                "Content is required".to_string(),
            )));
        };
        Some(Ok((
            index,
            EntryUpdate {
                content,
                name: self.name.clone(),
                revision: self.revision.clone(),
            },
        )))
    }
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    if let Some(edit) = req.entry_update() {
        let (index, update) = edit?;
        state
            .store
            .update_entry(&id, index, &update)
            .map_err(error_response)?;
        return Ok(SuccessResponse::ok());
    }

    if let Some(name) = req.name.as_deref().filter(|n| !n.trim().is_empty()) {
        state.store.update_title(&id, name).map_err(error_response)?;
        return Ok(SuccessResponse::ok());
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Invalid request parameters".to_string(),
    ))
}

/// Delete one entry (`?index=N`) or, without an index, the whole session.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<SuccessResponse>, (StatusCode, String)> {
    match query.index()? {
        Some(index) => state
            .store
            .delete_entry(&id, index, query.revision.as_deref())
            .map_err(error_response)?,
        None => {
            state.store.delete(&id).map_err(error_response)?;
            info!(target: "sqlbook::api", "Deleted session {}", id);
        }
    }
    Ok(SuccessResponse::ok())
}
