//! Decides whether a membership record's window must be propagated.

use crate::{mapping::MappingEntry, record::MembershipRecord};

/// True when `record` has never been seen before, or when its end date
/// differs from the last-synced baseline.
///
/// Only `valid_until` is compared. A start-date change with an unchanged end
/// date does not propagate: end-date drift is the one trigger condition,
/// which keeps adapter-side rounding of start dates from causing spurious
/// writes. This is policy, not an oversight.
pub fn needs_update(
  record: &MembershipRecord,
  prior: Option<&MappingEntry>,
) -> bool {
  match prior {
    None => true,
    Some(entry) => entry.valid_until != record.valid_until,
  }
}
