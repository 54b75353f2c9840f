//! IVMS access-control sink adapter.
//!
//! Implements [`AccessControlSink`] over the terminal's ISAPI-style JSON
//! surface: a paginated `UserInfo/Search` for listing identities and a
//! `UserInfo/Modify` for pushing validity windows.

pub mod error;
pub mod payload;

pub use error::{Error, Result};

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use uuid::Uuid;

use gatesync_core::{record::AccessIdentity, sink::AccessControlSink};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the IVMS terminal.
#[derive(Debug, Clone)]
pub struct IvmsConfig {
  pub base_url:  String,
  pub username:  String,
  pub password:  String,
  /// Identities fetched per search page.
  pub page_size: u32,
}

impl IvmsConfig {
  pub const DEFAULT_PAGE_SIZE: u32 = 30;
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the IVMS ISAPI surface.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct IvmsClient {
  http:   Client,
  config: IvmsConfig,
}

impl IvmsClient {
  pub fn new(config: IvmsConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { http, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  /// Drain the paginated `UserInfo/Search` endpoint.
  ///
  /// Users with a garbled validity period are logged and skipped; the rest
  /// of the page is still used.
  pub async fn search_users(&self) -> Result<Vec<AccessIdentity>> {
    let search_id = Uuid::new_v4().to_string();
    let mut identities = Vec::new();
    let mut position = 0u32;

    loop {
      let request = payload::UserInfoSearchRequest::page(
        &search_id,
        position,
        self.config.page_size,
      );

      let resp = self
        .http
        .post(self.url("/ISAPI/AccessControl/UserInfo/Search?format=json"))
        .basic_auth(&self.config.username, Some(&self.config.password))
        .json(&request)
        .send()
        .await?;

      if !resp.status().is_success() {
        return Err(Error::Status(resp.status()));
      }

      let page: payload::UserInfoSearchResponse = resp.json().await?;
      let result = page.result;
      let fetched = result.user_info.len() as u32;

      for user in result.user_info {
        let employee_no = user.employee_no.clone();
        match payload::to_identity(user) {
          Ok(identity) => identities.push(identity),
          Err(e) => {
            warn!(%employee_no, error = %e, "malformed user entry skipped");
          }
        }
      }

      position += fetched;
      if fetched == 0 || position >= result.total_matches {
        break;
      }
    }

    debug!(total = identities.len(), "identity listing fetched");
    Ok(identities)
  }

  /// `PUT UserInfo/Modify` — push a new validity window to one identity.
  ///
  /// Returns `Ok(false)` when the terminal reports the write as rejected
  /// (unknown employee number, refused update).
  pub async fn modify_validity(
    &self,
    identity_id: &str,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
  ) -> Result<bool> {
    let request =
      payload::UserInfoModifyRequest::new(identity_id, valid_from, valid_until);

    let resp = self
      .http
      .put(self.url("/ISAPI/AccessControl/UserInfo/Modify?format=json"))
      .basic_auth(&self.config.username, Some(&self.config.password))
      .json(&request)
      .send()
      .await?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    if !status.is_success() {
      return Err(Error::Status(status));
    }

    let outcome: payload::ResponseStatus = resp.json().await?;
    if !outcome.is_ok() {
      warn!(
        %identity_id,
        status_code = outcome.status_code,
        status = outcome.status_string.as_deref().unwrap_or(""),
        "ivms rejected validity update"
      );
    }
    Ok(outcome.is_ok())
  }
}

impl AccessControlSink for IvmsClient {
  type Error = Error;

  async fn list_identities(&self) -> Result<Vec<AccessIdentity>> {
    self.search_users().await
  }

  async fn update_validity(
    &self,
    identity_id: &str,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
  ) -> Result<bool> {
    self.modify_validity(identity_id, valid_from, valid_until).await
  }
}
