//! Query execution route.

use super::error_response;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlbook_core::RunOutcome;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run SQL for a session. Both outcomes are recorded in the transcript; a
/// failed query answers 500 with the database's message.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> Result<(StatusCode, Json<ExecuteResponse>), (StatusCode, String)> {
    let (Some(sql), Some(session_id)) = (
        req.sql.as_deref().filter(|s| !s.trim().is_empty()),
        req.session_id.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing sql or sessionId".to_string(),
        ));
    };

    let run = state
        .runner
        .run(session_id, sql)
        .await
        .map_err(error_response)?;

    let response = match run {
        RunOutcome::Success { outcome, markdown } => (
            StatusCode::OK,
            ExecuteResponse {
                success: true,
                rows: Some(outcome.json_rows()),
                row_count: Some(outcome.row_count()),
                markdown: Some(markdown),
                error: None,
            },
        ),
        RunOutcome::Failed { error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ExecuteResponse {
                success: false,
                rows: None,
                row_count: None,
                markdown: None,
                error: Some(error),
            },
        ),
    };
    Ok((response.0, Json(response.1)))
}
