//! The durable join between a member's email and the sink-side state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::MembershipRecord;

/// One persisted row per email, primary key = email.
///
/// Created on first sight of an email from the source, updated (never
/// recreated) on every later pass where the email is still present, never
/// deleted by the engine. Entries for lapsed members are retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
  pub email:       String,
  pub member_id:   String,
  pub first_name:  String,
  pub last_name:   String,
  /// Baseline for change detection: the window written on the most recent
  /// successful persistence.
  pub valid_from:  DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  /// The resolved access-control identity, once established. Sticky: never
  /// cleared or re-derived by the engine, even if the sink's copy of this
  /// email later changes or disappears.
  pub identity_id: Option<String>,
  pub member_code: Option<String>,
  pub role_name:   Option<String>,
  pub phone:       Option<String>,
}

impl MappingEntry {
  /// The entry an upsert of `record` produces when no prior entry exists.
  pub fn from_record(
    record: &MembershipRecord,
    identity_id: Option<String>,
  ) -> Self {
    Self {
      email: record.email.clone(),
      member_id: record.member_id.clone(),
      first_name: record.first_name.clone(),
      last_name: record.last_name.clone(),
      valid_from: record.valid_from,
      valid_until: record.valid_until,
      identity_id,
      member_code: record.member_code.clone(),
      role_name: record.role_name.clone(),
      phone: record.phone.clone(),
    }
  }
}
