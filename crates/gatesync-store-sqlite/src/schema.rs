//! SQL schema for the gatesync SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per member email; the durable join between the membership system
-- and the access-control sink. Rows are upserted, never deleted.
CREATE TABLE IF NOT EXISTS mappings (
    email        TEXT PRIMARY KEY,
    member_id    TEXT NOT NULL,
    first_name   TEXT NOT NULL,
    last_name    TEXT NOT NULL,
    valid_from   TEXT NOT NULL,   -- RFC 3339 UTC
    valid_until  TEXT NOT NULL,   -- RFC 3339 UTC; change-detection baseline
    identity_id  TEXT,            -- sink identity; NULL until resolved
    member_code  TEXT,
    role_name    TEXT,
    phone        TEXT
);

CREATE INDEX IF NOT EXISTS mappings_identity_idx ON mappings(identity_id);

PRAGMA user_version = 1;
";
