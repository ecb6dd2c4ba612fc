//! Database listing route.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::warn;

pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    let databases = state.executor.list_databases().await.map_err(|e| {
        warn!(target: "sqlbook::api", "Listing databases failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(databases))
}
