//! Error type for `gatesync-ivms`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http transport error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("ivms returned HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("malformed ivms response: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unparseable vendor timestamp: {0:?}")]
  Timestamp(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
