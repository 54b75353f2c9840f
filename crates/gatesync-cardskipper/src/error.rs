//! Error type for `gatesync-cardskipper`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http transport error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("cardskipper returned HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("malformed member export: {0}")]
  Xml(#[from] quick_xml::DeError),

  #[error("request serialization error: {0}")]
  XmlSe(#[from] quick_xml::SeError),

  #[error("unparseable vendor timestamp: {0:?}")]
  Timestamp(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
