use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    /// Also forget persisted all-time progress
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub snapshot_reset: bool,
}

/// POST /api/refresh
/// Drop every cached dataset so the next request re-fetches
pub async fn post_refresh(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefreshParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.service.refresh(params.snapshot).await.map_err(|e| {
        tracing::error!("Refresh failed: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(RefreshResponse {
        status: "cleared",
        snapshot_reset: params.snapshot,
    }))
}
