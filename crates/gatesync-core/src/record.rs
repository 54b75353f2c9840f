//! Normalized records exchanged with the membership source and the
//! access-control sink.
//!
//! Source adapters collapse whatever nesting their vendor uses into the flat
//! [`MembershipRecord`] before it reaches the engine. Nothing in this crate
//! depends on a vendor payload shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Membership side ─────────────────────────────────────────────────────────

/// One currently-valid membership, as reported by the source system.
///
/// Produced fresh on every sync pass; the engine never mutates it. Expired
/// memberships are not reported at all and so are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
  /// The natural join key between the two systems.
  pub email:       String,
  /// Identifier assigned by the membership system.
  pub member_id:   String,
  pub first_name:  String,
  pub last_name:   String,
  pub valid_from:  DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  // Descriptive fields carried through to the mapping store. Never consulted
  // for matching or change detection.
  pub member_code: Option<String>,
  pub role_name:   Option<String>,
  pub phone:       Option<String>,
}

impl MembershipRecord {
  /// Check the invariants the engine relies on: a non-empty email and a
  /// validity window that ends strictly after it starts.
  pub fn validate(&self) -> Result<()> {
    if self.email.trim().is_empty() {
      return Err(Error::MissingEmail {
        member_id: self.member_id.clone(),
      });
    }
    if self.valid_until <= self.valid_from {
      return Err(Error::InvalidWindow {
        email: self.email.clone(),
      });
    }
    Ok(())
  }
}

// ─── Access-control side ─────────────────────────────────────────────────────

/// One identity known to the access-control sink.
///
/// Fetched fresh each pass. The engine never mutates an identity directly;
/// all writes go through
/// [`AccessControlSink::update_validity`](crate::sink::AccessControlSink::update_validity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessIdentity {
  /// The credential the sink accepts for updates (e.g. an employee number).
  pub identity_id: String,
  /// May be absent or blank; sink-side contact data is best-effort.
  pub email:       Option<String>,
  /// The window currently active on the sink side.
  pub valid_from:  DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  pub enabled:     bool,
}
