//! Identity resolution between membership records and access identities.
//!
//! Email is the only key the two systems share, and it is noisy: it can be
//! blank on the sink side, duplicated across renames, or missing entirely.
//! Once a mapping has been established it is trusted over anything the sink
//! reports later.

use std::collections::HashMap;

use crate::{
  mapping::MappingEntry,
  record::{AccessIdentity, MembershipRecord},
};

/// Index the sink's identities by email for lookups during a pass.
///
/// Identities without a usable email are skipped. When two identities share
/// an email, the first one in the adapter's returned order wins; duplicates
/// are a sink-side data quality problem, not something the matcher
/// arbitrates.
pub fn index_by_email(
  identities: Vec<AccessIdentity>,
) -> HashMap<String, AccessIdentity> {
  let mut by_email = HashMap::with_capacity(identities.len());
  for identity in identities {
    let Some(email) = identity.email.clone() else {
      continue;
    };
    if email.trim().is_empty() {
      continue;
    }
    by_email.entry(email).or_insert(identity);
  }
  by_email
}

/// Resolve the access-control identity for `record`, in strict priority
/// order:
///
/// 1. a sticky prior mapping wins unconditionally, even if the sink's
///    identity for that email has since changed or disappeared;
/// 2. otherwise a fresh lookup against the sink's current identity list;
/// 3. otherwise unmatched.
///
/// Unmatched is not an error: the record is still persisted without a linked
/// identity and resolution is re-attempted on every later pass.
pub fn resolve(
  record: &MembershipRecord,
  prior: Option<&MappingEntry>,
  identities_by_email: &HashMap<String, AccessIdentity>,
) -> Option<String> {
  if let Some(id) = prior.and_then(|entry| entry.identity_id.clone()) {
    return Some(id);
  }
  identities_by_email
    .get(&record.email)
    .map(|identity| identity.identity_id.clone())
}
