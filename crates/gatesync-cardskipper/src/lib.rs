//! Cardskipper membership source adapter.
//!
//! Implements [`MembershipSource`] over the Cardskipper member-export HTTP
//! API. The vendor speaks XML; everything nested is flattened in
//! [`payload`] before it reaches the engine.

pub mod error;
pub mod payload;

pub use error::{Error, Result};

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, header};
use tracing::{debug, warn};

use gatesync_core::{record::MembershipRecord, source::MembershipSource};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the Cardskipper API.
#[derive(Debug, Clone)]
pub struct CardskipperConfig {
  pub base_url:        String,
  pub username:        String,
  pub password:        String,
  /// The organisation whose members are exported.
  pub organisation_id: i64,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the Cardskipper member-export API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct CardskipperClient {
  http:   Client,
  config: CardskipperConfig,
}

impl CardskipperClient {
  pub fn new(config: CardskipperConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { http, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  /// `POST /Member/Export` — fetch the organisation's members and collapse
  /// them into flat records, keeping only currently-valid ones.
  ///
  /// Individual members that cannot be used (no email, no active role, or a
  /// garbled entry) are logged and skipped; they never fail the fetch.
  pub async fn export_active_members(&self) -> Result<Vec<MembershipRecord>> {
    let criteria = quick_xml::se::to_string(&payload::SearchCriteria {
      organisation_id: self.config.organisation_id,
    })?;

    let resp = self
      .http
      .post(self.url("/Member/Export"))
      .basic_auth(&self.config.username, Some(&self.config.password))
      .header(header::CONTENT_TYPE, "application/xml")
      .body(criteria)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let body = resp.text().await?;
    let export: payload::MemberExport = quick_xml::de::from_str(&body)?;

    let now = Utc::now();
    let mut records = Vec::new();
    for member in &export.members.members {
      match payload::to_record(member, now) {
        Ok(Some(record)) => records.push(record),
        Ok(None) => {
          debug!(
            member_id = %member.organisation_member_id,
            "member skipped (no email or no active role)"
          );
        }
        Err(e) => {
          warn!(
            member_id = %member.organisation_member_id,
            error = %e,
            "malformed member entry skipped"
          );
        }
      }
    }

    debug!(total = export.members.members.len(), active = records.len(), "member export fetched");
    Ok(records)
  }
}

impl MembershipSource for CardskipperClient {
  type Error = Error;

  async fn active_members(&self) -> Result<Vec<MembershipRecord>> {
    self.export_active_members().await
  }
}
