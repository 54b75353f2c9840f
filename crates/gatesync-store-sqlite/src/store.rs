//! [`SqliteMappingStore`] — the SQLite implementation of [`MappingStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::OptionalExtension as _;

use gatesync_core::{
  mapping::MappingEntry, record::MembershipRecord, store::MappingStore,
};

use crate::{
  encode::{RawMapping, encode_dt},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gatesync mapping store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteMappingStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteMappingStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── MappingStore impl ───────────────────────────────────────────────────────

impl MappingStore for SqliteMappingStore {
  type Error = Error;

  async fn load_all(&self) -> Result<HashMap<String, MappingEntry>> {
    let raws: Vec<RawMapping> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT email, member_id, first_name, last_name,
                  valid_from, valid_until, identity_id,
                  member_code, role_name, phone
           FROM mappings",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawMapping {
              email:       row.get(0)?,
              member_id:   row.get(1)?,
              first_name:  row.get(2)?,
              last_name:   row.get(3)?,
              valid_from:  row.get(4)?,
              valid_until: row.get(5)?,
              identity_id: row.get(6)?,
              member_code: row.get(7)?,
              role_name:   row.get(8)?,
              phone:       row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| {
        let entry = raw.into_entry()?;
        Ok((entry.email.clone(), entry))
      })
      .collect()
  }

  async fn upsert(
    &self,
    record: &MembershipRecord,
    identity_id: Option<&str>,
  ) -> Result<()> {
    let email       = record.email.clone();
    let member_id   = record.member_id.clone();
    let first_name  = record.first_name.clone();
    let last_name   = record.last_name.clone();
    let valid_from  = encode_dt(record.valid_from);
    let valid_until = encode_dt(record.valid_until);
    let identity_id = identity_id.map(str::to_owned);
    let member_code = record.member_code.clone();
    let role_name   = record.role_name.clone();
    let phone       = record.phone.clone();

    self
      .conn
      .call(move |conn| {
        // One statement, one implicit transaction. COALESCE keeps a resolved
        // identity when the caller passes NULL: a mapping is sticky.
        conn.execute(
          "INSERT INTO mappings (
             email, member_id, first_name, last_name,
             valid_from, valid_until, identity_id,
             member_code, role_name, phone
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT(email) DO UPDATE SET
             member_id   = excluded.member_id,
             first_name  = excluded.first_name,
             last_name   = excluded.last_name,
             valid_from  = excluded.valid_from,
             valid_until = excluded.valid_until,
             identity_id = COALESCE(excluded.identity_id, mappings.identity_id),
             member_code = excluded.member_code,
             role_name   = excluded.role_name,
             phone       = excluded.phone",
          rusqlite::params![
            email,
            member_id,
            first_name,
            last_name,
            valid_from,
            valid_until,
            identity_id,
            member_code,
            role_name,
            phone,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn identity_id(&self, email: &str) -> Result<Option<String>> {
    let email = email.to_owned();

    let id: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT identity_id FROM mappings WHERE email = ?1",
              rusqlite::params![email],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(id.flatten())
  }
}
