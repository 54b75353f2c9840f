//! The sync engine — one `run_pass` call per fetch-match-detect-persist-
//! propagate cycle.
//!
//! The engine owns nothing shared: its store, source, and sink are injected
//! at construction. It provides no internal locking; callers must not
//! overlap passes (the CLI scheduler runs them from a single loop).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  detect,
  mapping::MappingEntry,
  matcher,
  record::{AccessIdentity, MembershipRecord},
  sink::AccessControlSink,
  source::MembershipSource,
  store::MappingStore,
};

// ─── Report types ────────────────────────────────────────────────────────────

/// A problem with one record during a pass. Never fatal to the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
  pub email:   String,
  pub message: String,
}

/// The outcome of one synchronization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
  /// Correlates log lines with this report.
  pub pass_id:           Uuid,
  pub started_at:        DateTime<Utc>,
  pub finished_at:       DateTime<Utc>,
  /// Records fetched from the membership source.
  pub total_records:     usize,
  /// Propagation writes queued: records whose window changed (or that were
  /// seen for the first time) and that resolved to an access identity.
  pub updates_needed:    usize,
  /// Queued writes the sink accepted.
  pub updates_completed: usize,
  /// Records persisted without a resolved identity this pass.
  pub unmatched:         usize,
  pub errors:            Vec<RecordError>,
  /// Set when the mapping-store snapshot failed to load and the pass ran
  /// against an empty baseline.
  pub snapshot_error:    Option<String>,
}

impl SyncReport {
  fn new(pass_id: Uuid, started_at: DateTime<Utc>) -> Self {
    Self {
      pass_id,
      started_at,
      finished_at: started_at,
      total_records: 0,
      updates_needed: 0,
      updates_completed: 0,
      unmatched: 0,
      errors: Vec::new(),
      snapshot_error: None,
    }
  }
}

// ─── Pass error ──────────────────────────────────────────────────────────────

/// An error that aborts an entire pass before anything is written. Anything
/// less is captured per record in the [`SyncReport`] instead.
#[derive(Debug, Error)]
pub enum PassError {
  #[error("membership source unavailable: {0}")]
  SourceUnavailable(Box<dyn std::error::Error + Send + Sync>),

  #[error("access-control sink unavailable: {0}")]
  SinkUnavailable(Box<dyn std::error::Error + Send + Sync>),
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// A propagation write queued during record processing and issued after all
/// records are persisted.
struct QueuedWrite {
  email:       String,
  identity_id: String,
  valid_from:  DateTime<Utc>,
  valid_until: DateTime<Utc>,
}

/// Drives synchronization passes from the membership source to the
/// access-control sink, tracking state in the mapping store.
pub struct SyncEngine<St, So, Si> {
  store:  St,
  source: So,
  sink:   Si,
}

impl<St, So, Si> SyncEngine<St, So, Si>
where
  St: MappingStore,
  So: MembershipSource,
  Si: AccessControlSink,
{
  pub fn new(store: St, source: So, sink: Si) -> Self {
    Self { store, source, sink }
  }

  /// Run one full synchronization pass.
  ///
  /// Returns `Err` only when the initial fetch from the source or the sink
  /// fails outright; every per-record problem is recorded in the report and
  /// processing continues with the next record.
  pub async fn run_pass(&self) -> Result<SyncReport, PassError> {
    let pass_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%pass_id, "starting sync pass");

    // 1. Active members. An empty set is a no-op, not a failure.
    let members = self
      .source
      .active_members()
      .await
      .map_err(|e| PassError::SourceUnavailable(Box::new(e)))?;
    if members.is_empty() {
      info!(%pass_id, "membership source reported no active members");
      let mut report = SyncReport::new(pass_id, started_at);
      report.finished_at = Utc::now();
      return Ok(report);
    }

    // 2. Sink identities, indexed by email.
    let identities = self
      .sink
      .list_identities()
      .await
      .map_err(|e| PassError::SinkUnavailable(Box::new(e)))?;
    let identities_by_email = matcher::index_by_email(identities);

    // 3. One store snapshot for the whole pass; earlier upserts in the same
    // pass never affect later records' matching. A failed load degrades to
    // an empty baseline so current state can still be persisted.
    let (snapshot, snapshot_error) = match self.store.load_all().await {
      Ok(map) => (map, None),
      Err(e) => {
        warn!(
          %pass_id,
          error = %e,
          "mapping store snapshot failed; proceeding with no prior state"
        );
        (HashMap::new(), Some(e.to_string()))
      }
    };

    let mut report = SyncReport::new(pass_id, started_at);
    report.total_records = members.len();
    report.snapshot_error = snapshot_error;

    // 4. Match, detect, persist; queue propagation writes.
    let mut queue: Vec<QueuedWrite> = Vec::new();
    for record in &members {
      if let Err(message) = self
        .process_record(record, &snapshot, &identities_by_email, &mut queue, &mut report)
        .await
      {
        warn!(email = %record.email, %message, "record skipped");
        report.errors.push(RecordError {
          email: record.email.clone(),
          message,
        });
      }
    }
    report.updates_needed = queue.len();

    // 5. Issue queued writes, each independent: no retry, and no rollback of
    // the upsert already committed in step 4. The store reflects the
    // membership system's intended state even when the sink write fails, so
    // the next pass will not re-attempt it.
    for write in queue {
      match self
        .sink
        .update_validity(&write.identity_id, write.valid_from, write.valid_until)
        .await
      {
        Ok(true) => {
          info!(
            email = %write.email,
            identity_id = %write.identity_id,
            valid_until = %write.valid_until,
            "validity window propagated"
          );
          report.updates_completed += 1;
        }
        Ok(false) => {
          warn!(
            email = %write.email,
            identity_id = %write.identity_id,
            "sink rejected validity update"
          );
          report.errors.push(RecordError {
            email:   write.email,
            message: format!(
              "sink rejected update for identity {}",
              write.identity_id
            ),
          });
        }
        Err(e) => {
          warn!(email = %write.email, error = %e, "validity update failed");
          report.errors.push(RecordError {
            email:   write.email,
            message: e.to_string(),
          });
        }
      }
    }

    report.finished_at = Utc::now();
    info!(
      %pass_id,
      total = report.total_records,
      needed = report.updates_needed,
      completed = report.updates_completed,
      unmatched = report.unmatched,
      errors = report.errors.len(),
      "sync pass finished"
    );
    Ok(report)
  }

  /// Handle one membership record. An `Err` is recorded against this record
  /// alone; the pass continues.
  async fn process_record(
    &self,
    record: &MembershipRecord,
    snapshot: &HashMap<String, MappingEntry>,
    identities_by_email: &HashMap<String, AccessIdentity>,
    queue: &mut Vec<QueuedWrite>,
    report: &mut SyncReport,
  ) -> Result<(), String> {
    record.validate().map_err(|e| e.to_string())?;

    let prior = snapshot.get(&record.email);
    let identity_id = matcher::resolve(record, prior, identities_by_email);
    let needs_update = detect::needs_update(record, prior);

    // The store always receives the record's current state, matched or not.
    self
      .store
      .upsert(record, identity_id.as_deref())
      .await
      .map_err(|e| format!("mapping store upsert failed: {e}"))?;

    match identity_id {
      None => {
        report.unmatched += 1;
        debug!(email = %record.email, "no access identity resolved; will retry next pass");
      }
      Some(identity_id) if needs_update => {
        debug!(
          email = %record.email,
          %identity_id,
          valid_until = %record.valid_until,
          "queueing validity update"
        );
        queue.push(QueuedWrite {
          email: record.email.clone(),
          identity_id,
          valid_from: record.valid_from,
          valid_until: record.valid_until,
        });
      }
      Some(_) => {}
    }
    Ok(())
  }
}
