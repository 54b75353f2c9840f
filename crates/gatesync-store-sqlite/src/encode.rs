//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use gatesync_core::mapping::MappingEntry;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `mappings` row.
pub struct RawMapping {
  pub email:       String,
  pub member_id:   String,
  pub first_name:  String,
  pub last_name:   String,
  pub valid_from:  String,
  pub valid_until: String,
  pub identity_id: Option<String>,
  pub member_code: Option<String>,
  pub role_name:   Option<String>,
  pub phone:       Option<String>,
}

impl RawMapping {
  pub fn into_entry(self) -> Result<MappingEntry> {
    Ok(MappingEntry {
      email:       self.email,
      member_id:   self.member_id,
      first_name:  self.first_name,
      last_name:   self.last_name,
      valid_from:  decode_dt(&self.valid_from)?,
      valid_until: decode_dt(&self.valid_until)?,
      identity_id: self.identity_id,
      member_code: self.member_code,
      role_name:   self.role_name,
      phone:       self.phone,
    })
  }
}
