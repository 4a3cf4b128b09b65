use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::snapshot::{Snapshot, TableStatus};

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub status: &'static str,
    pub loaded_at: DateTime<Utc>,
    pub tables: Vec<TableStatus>,
}

impl SnapshotResponse {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            status: "ok",
            loaded_at: snapshot.loaded_at,
            tables: snapshot.table_statuses(),
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<SnapshotResponse> {
    Json(SnapshotResponse::from_snapshot(&state.cache.get()))
}

/// Drop the cached snapshot and read every table again.
pub async fn reload(State(state): State<AppState>) -> Json<SnapshotResponse> {
    let snapshot = state.cache.reload();
    info!("Reload requested over the API");
    Json(SnapshotResponse::from_snapshot(&snapshot))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
