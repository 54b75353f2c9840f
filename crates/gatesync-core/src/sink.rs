//! The access-control-sink seam.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::record::AccessIdentity;

/// A system holding access identities whose validity windows we push to.
pub trait AccessControlSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every identity the sink knows about.
  fn list_identities(
    &self,
  ) -> impl Future<Output = Result<Vec<AccessIdentity>, Self::Error>> + Send + '_;

  /// Push a new validity window to one identity.
  ///
  /// `Ok(false)` means the sink reported the write as rejected (unknown
  /// identity, refused update); transport failures surface as `Err`. Both
  /// are non-fatal to a pass.
  fn update_validity<'a>(
    &'a self,
    identity_id: &'a str,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
