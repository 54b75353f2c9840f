//! Read-only JSON status API for gatesync.
//!
//! Exposes an axum [`Router`] over any [`MappingStore`] plus the latest
//! [`SyncReport`]. Auth, TLS, and transport concerns are the caller's
//! responsibility; the surface is diagnostic, not a control plane.

pub mod error;
pub mod mappings;
pub mod status;

pub use error::ApiError;

use std::sync::Arc;

use axum::{Router, routing::get};
use gatesync_core::{engine::SyncReport, store::MappingStore};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
///
/// `last_report` is written by the scheduler loop after each pass and only
/// read here.
pub struct AppState<S> {
  pub store:       Arc<S>,
  pub last_report: Arc<RwLock<Option<SyncReport>>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      last_report: Arc::clone(&self.last_report),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MappingStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/api/status", get(status::handler::<S>))
    .route("/api/mappings", get(mappings::list::<S>))
    .route("/api/mappings/{email}", get(mappings::get_one::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, Utc};
  use gatesync_core::{
    engine::SyncReport, mapping::MappingEntry, record::MembershipRecord,
    store::MappingStore as _,
  };
  use gatesync_store_sqlite::SqliteMappingStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  fn dt(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
  }

  fn record(email: &str) -> MembershipRecord {
    MembershipRecord {
      email:       email.to_string(),
      member_id:   "1001".to_string(),
      first_name:  "Ana".to_string(),
      last_name:   "Novak".to_string(),
      valid_from:  dt("2024-01-01T00:00:00Z"),
      valid_until: dt("2025-01-01T00:00:00Z"),
      member_code: None,
      role_name:   Some("24/7".to_string()),
      phone:       None,
    }
  }

  async fn make_state() -> AppState<SqliteMappingStore> {
    let store = SqliteMappingStore::open_in_memory().await.unwrap();
    AppState {
      store:       Arc::new(store),
      last_report: Arc::new(RwLock::new(None)),
    }
  }

  async fn get(
    state: AppState<SqliteMappingStore>,
    uri: &str,
  ) -> axum::response::Response {
    let req = Request::builder()
      .method("GET")
      .uri(uri)
      .body(Body::empty())
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Status ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn status_before_any_pass_returns_404() {
    let state = make_state().await;
    let resp = get(state, "/api/status").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn status_returns_latest_report() {
    let state = make_state().await;
    let report = SyncReport {
      pass_id:           Uuid::new_v4(),
      started_at:        dt("2025-06-01T12:00:00Z"),
      finished_at:       dt("2025-06-01T12:00:02Z"),
      total_records:     7,
      updates_needed:    2,
      updates_completed: 2,
      unmatched:         1,
      errors:            Vec::new(),
      snapshot_error:    None,
    };
    *state.last_report.write().await = Some(report.clone());

    let resp = get(state, "/api/status").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["total_records"], 7);
    assert_eq!(json["updates_completed"], 2);
    assert_eq!(json["pass_id"], report.pass_id.to_string());
  }

  // ── Mappings ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mappings_list_is_sorted_by_email() {
    let state = make_state().await;
    state.store.upsert(&record("b@x.com"), None).await.unwrap();
    state
      .store
      .upsert(&record("a@x.com"), Some("42"))
      .await
      .unwrap();

    let resp = get(state, "/api/mappings").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let entries: Vec<MappingEntry> =
      serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].email, "a@x.com");
    assert_eq!(entries[0].identity_id.as_deref(), Some("42"));
    assert_eq!(entries[1].email, "b@x.com");
  }

  #[tokio::test]
  async fn mapping_get_one_returns_entry() {
    let state = make_state().await;
    state
      .store
      .upsert(&record("a@x.com"), Some("42"))
      .await
      .unwrap();

    let resp = get(state, "/api/mappings/a@x.com").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let entry: MappingEntry =
      serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(entry.email, "a@x.com");
    assert_eq!(entry.identity_id.as_deref(), Some("42"));
  }

  #[tokio::test]
  async fn mapping_get_one_unknown_email_returns_404() {
    let state = make_state().await;
    let resp = get(state, "/api/mappings/missing@x.com").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
