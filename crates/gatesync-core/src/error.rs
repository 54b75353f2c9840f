//! Error types for `gatesync-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A membership record arrived without the join key.
  #[error("membership record {member_id} has no email address")]
  MissingEmail { member_id: String },

  #[error("membership record for {email} has a validity window that ends before it starts")]
  InvalidWindow { email: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
