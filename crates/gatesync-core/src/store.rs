//! The [`MappingStore`] trait — the persistence seam of the sync engine.
//!
//! The trait is implemented by storage backends (e.g.
//! `gatesync-store-sqlite`). The engine and the status API depend on this
//! abstraction, not on any concrete backend.

use std::{collections::HashMap, future::Future};

use crate::{mapping::MappingEntry, record::MembershipRecord};

/// Abstraction over the durable email → [`MappingEntry`] table.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MappingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load every persisted entry, keyed by email.
  ///
  /// On success the snapshot is complete, never partial. The engine loads it
  /// once per pass and treats a failure as "no prior state" rather than
  /// aborting.
  fn load_all(
    &self,
  ) -> impl Future<Output = Result<HashMap<String, MappingEntry>, Self::Error>>
  + Send
  + '_;

  /// Create or overwrite the entry for `record.email` in one logical
  /// transaction.
  ///
  /// An existing entry's descriptive fields and validity window are
  /// overwritten with `record`'s. `identity_id` is written only when
  /// non-`None`; passing `None` must never blank out an identity stored by
  /// an earlier pass — a resolved mapping is sticky.
  fn upsert<'a>(
    &'a self,
    record: &'a MembershipRecord,
    identity_id: Option<&'a str>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Point lookup of the resolved identity for one email, usable outside a
  /// pass (diagnostic tooling).
  fn identity_id<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
