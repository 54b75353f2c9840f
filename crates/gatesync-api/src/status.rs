//! Handler for `/api/status` — the latest completed sync pass.

use axum::{Json, extract::State};
use gatesync_core::{engine::SyncReport, store::MappingStore};

use crate::{AppState, error::ApiError};

/// `GET /api/status`
///
/// Returns the report of the most recent completed pass, or 404 when no
/// pass has completed since the process started.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<SyncReport>, ApiError>
where
  S: MappingStore,
{
  let report = state.last_report.read().await.clone();
  report
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("no completed sync pass yet".to_string()))
}
