//! Handlers for `/api/mappings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/mappings` | All tracked members, sorted by email |
//! | `GET`  | `/api/mappings/{email}` | 404 if the email was never seen |

use axum::{
  Json,
  extract::{Path, State},
};
use gatesync_core::{mapping::MappingEntry, store::MappingStore};

use crate::{AppState, error::ApiError};

/// `GET /api/mappings`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<MappingEntry>>, ApiError>
where
  S: MappingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let all = state
    .store
    .load_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut entries: Vec<MappingEntry> = all.into_values().collect();
  entries.sort_by(|a, b| a.email.cmp(&b.email));
  Ok(Json(entries))
}

/// `GET /api/mappings/{email}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(email): Path<String>,
) -> Result<Json<MappingEntry>, ApiError>
where
  S: MappingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut all = state
    .store
    .load_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  all
    .remove(&email)
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no mapping for {email}")))
}
