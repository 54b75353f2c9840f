//! Integration tests for `SqliteMappingStore` against an in-memory database.

use chrono::{DateTime, Utc};
use gatesync_core::{record::MembershipRecord, store::MappingStore};

use crate::SqliteMappingStore;

async fn store() -> SqliteMappingStore {
  SqliteMappingStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn dt(s: &str) -> DateTime<Utc> {
  s.parse().expect("test timestamp")
}

fn record(email: &str, valid_until: &str) -> MembershipRecord {
  MembershipRecord {
    email:       email.to_string(),
    member_id:   "1001".to_string(),
    first_name:  "Adi".to_string(),
    last_name:   "Mijatović".to_string(),
    valid_from:  dt("2024-07-01T00:00:00Z"),
    valid_until: dt(valid_until),
    member_code: Some("3ket5yk".to_string()),
    role_name:   Some("Dijak 16-17".to_string()),
    phone:       Some("+38670123456".to_string()),
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_entry() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("42"))
    .await
    .unwrap();

  let all = s.load_all().await.unwrap();
  assert_eq!(all.len(), 1);

  let entry = &all["a@x.com"];
  assert_eq!(entry.member_id, "1001");
  assert_eq!(entry.identity_id.as_deref(), Some("42"));
  assert_eq!(entry.valid_until, dt("2025-02-07T23:59:59Z"));
  assert_eq!(entry.role_name.as_deref(), Some("Dijak 16-17"));
}

#[tokio::test]
async fn upsert_without_identity_creates_unresolved_entry() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), None)
    .await
    .unwrap();

  let all = s.load_all().await.unwrap();
  assert_eq!(all["a@x.com"].identity_id, None);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_overwrites_window_and_descriptive_fields() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("42"))
    .await
    .unwrap();

  let mut extended = record("a@x.com", "2025-06-01T23:59:59Z");
  extended.role_name = Some("24/7".to_string());
  extended.phone = None;
  s.upsert(&extended, Some("42")).await.unwrap();

  let all = s.load_all().await.unwrap();
  assert_eq!(all.len(), 1);

  let entry = &all["a@x.com"];
  assert_eq!(entry.valid_until, dt("2025-06-01T23:59:59Z"));
  assert_eq!(entry.role_name.as_deref(), Some("24/7"));
  assert_eq!(entry.phone, None);
}

#[tokio::test]
async fn upsert_with_none_keeps_resolved_identity() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("42"))
    .await
    .unwrap();

  // A later pass that fails to resolve must not blank the mapping.
  s.upsert(&record("a@x.com", "2025-06-01T23:59:59Z"), None)
    .await
    .unwrap();

  let all = s.load_all().await.unwrap();
  assert_eq!(all["a@x.com"].identity_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn upsert_with_some_overwrites_identity() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("42"))
    .await
    .unwrap();
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("77"))
    .await
    .unwrap();

  let all = s.load_all().await.unwrap();
  assert_eq!(all["a@x.com"].identity_id.as_deref(), Some("77"));
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn identity_id_point_lookup() {
  let s = store().await;
  s.upsert(&record("a@x.com", "2025-02-07T23:59:59Z"), Some("42"))
    .await
    .unwrap();
  s.upsert(&record("b@x.com", "2025-02-07T23:59:59Z"), None)
    .await
    .unwrap();

  assert_eq!(s.identity_id("a@x.com").await.unwrap().as_deref(), Some("42"));
  assert_eq!(s.identity_id("b@x.com").await.unwrap(), None);
  assert_eq!(s.identity_id("missing@x.com").await.unwrap(), None);
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_all_on_empty_store_returns_empty_map() {
  let s = store().await;
  assert!(s.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn load_all_returns_every_entry() {
  let s = store().await;
  for email in ["a@x.com", "b@x.com", "c@x.com"] {
    s.upsert(&record(email, "2025-02-07T23:59:59Z"), None)
      .await
      .unwrap();
  }

  let all = s.load_all().await.unwrap();
  assert_eq!(all.len(), 3);
  assert!(all.contains_key("b@x.com"));
}

#[tokio::test]
async fn timestamps_roundtrip_through_storage() {
  let s = store().await;
  let original = record("a@x.com", "2025-02-07T23:59:59Z");
  s.upsert(&original, None).await.unwrap();

  let all = s.load_all().await.unwrap();
  let entry = &all["a@x.com"];
  assert_eq!(entry.valid_from, original.valid_from);
  assert_eq!(entry.valid_until, original.valid_until);
}
