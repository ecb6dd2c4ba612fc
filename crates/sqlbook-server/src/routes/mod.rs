//! HTTP route handlers.

pub mod databases;
pub mod execute;
pub mod general;
pub mod sessions;

use crate::state::AppState;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlbook_core::SqlbookError;
use sqlbook_types::EntryKind;
use std::sync::Arc;
use tracing::error;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Body of successful mutations.
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Raw document text.
#[derive(Serialize)]
pub struct ContentResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Body for appending an entry.
#[derive(Deserialize)]
pub struct AppendRequest {
    /// Entry kind name (`"note"`, `"saved-query"`, `"mermaid"`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Saved query name; content is the bare SQL when present.
    #[serde(default)]
    pub name: Option<String>,
}

impl AppendRequest {
    /// Resolve the kind and content, defaulting the kind to `default`.
    pub fn parts(&self, default: EntryKind) -> Result<(EntryKind, &str), (StatusCode, String)> {
        let kind = match self.kind.as_deref() {
            None => default,
            Some(name) => EntryKind::from_type_name(name).ok_or_else(|| {
                (StatusCode::BAD_REQUEST, format!("Unknown entry type: {}", name))
            })?,
        };
        let content = self
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| (StatusCode::BAD_REQUEST, "Content is required".to_string()))?;
        Ok((kind, content))
    }
}

/// Index parameters for entry deletion (`?index=N&revision=R`).
#[derive(Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

impl EntryQuery {
    /// Parsed index, `None` when the parameter is absent.
    pub fn index(&self) -> Result<Option<usize>, (StatusCode, String)> {
        self.index
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid index".to_string()))
            })
            .transpose()
    }
}

/// Map a core error to an HTTP status and message.
pub fn error_response(e: SqlbookError) -> (StatusCode, String) {
    let status = match &e {
        SqlbookError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SqlbookError::InvalidSessionId(_)
        | SqlbookError::IndexOutOfBounds { .. }
        | SqlbookError::InvalidTarget(_)
        | SqlbookError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        SqlbookError::StaleRevision { .. } => StatusCode::CONFLICT,
        SqlbookError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(target: "sqlbook::api", "Request failed: {}", e);
    }
    (status, e.to_string())
}

/// Every API route, to be nested under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(sessions::list).post(sessions::create))
        .route(
            "/sessions/{id}",
            get(sessions::get)
                .post(sessions::append)
                .patch(sessions::update)
                .delete(sessions::delete),
        )
        .route("/sessions/{id}/view", get(sessions::view))
        .route("/sessions/{id}/database", get(sessions::database))
        .route("/sessions/{id}/page-break", post(sessions::page_break))
        .route(
            "/general",
            get(general::get)
                .post(general::append)
                .patch(general::update)
                .delete(general::delete),
        )
        .route("/general/view", get(general::view))
        .route("/execute", post(execute::execute))
        .route("/databases", get(databases::list))
        .route("/health", get(health))
}
