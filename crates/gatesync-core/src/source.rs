//! The membership-source seam.

use std::future::Future;

use crate::record::MembershipRecord;

/// A system that reports the currently-valid membership set.
///
/// Implementations must return only records whose validity window covers the
/// moment of the call. A transport or auth failure surfaces as `Err` and
/// aborts the pass before anything is written.
pub trait MembershipSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn active_members(
    &self,
  ) -> impl Future<Output = Result<Vec<MembershipRecord>, Self::Error>> + Send + '_;
}
