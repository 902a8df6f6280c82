//! SQLite-backed record store.
//!
//! One `Store` per process, sharing a single connection behind a mutex. All
//! operations take the acting [`Profile`] and enforce the visibility policy
//! and the status state machine before touching rows; status writes carry an
//! expected-status precondition so concurrent transitions surface as
//! [`NegoError::Conflict`] instead of lost updates.

mod comments;
mod deals;
mod notes;
mod packs;
mod suppliers;
mod users;

use crate::error::{NegoError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    role          TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS password_resets (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suppliers (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    contact_person TEXT NOT NULL DEFAULT '',
    email          TEXT NOT NULL DEFAULT '',
    phone          TEXT NOT NULL DEFAULT '',
    category       TEXT NOT NULL DEFAULT '',
    owner_id       TEXT NOT NULL REFERENCES users(id),
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS deals (
    id               TEXT PRIMARY KEY,
    owner_id         TEXT NOT NULL REFERENCES users(id),
    supplier_id      TEXT NOT NULL REFERENCES suppliers(id),
    title            TEXT NOT NULL,
    scope            TEXT NOT NULL,
    pricing_model    TEXT NOT NULL,
    deal_value       REAL,
    deadline         TEXT,
    key_issues       TEXT NOT NULL,
    desired_outcomes TEXT NOT NULL,
    status           TEXT NOT NULL,
    admin_feedback   TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS negotiation_packs (
    deal_id        TEXT PRIMARY KEY REFERENCES deals(id) ON DELETE CASCADE,
    targets        TEXT NOT NULL,
    red_lines      TEXT NOT NULL,
    tradeables     TEXT NOT NULL,
    batna          TEXT NOT NULL,
    questions      TEXT NOT NULL,
    meeting_agenda TEXT NOT NULL,
    generated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meeting_notes (
    deal_id              TEXT PRIMARY KEY REFERENCES deals(id) ON DELETE CASCADE,
    meeting_date         TEXT NOT NULL,
    location             TEXT NOT NULL DEFAULT '',
    attendees            TEXT NOT NULL,
    discussion_points    TEXT NOT NULL DEFAULT '',
    decisions_made       TEXT NOT NULL DEFAULT '',
    concessions_granted  TEXT NOT NULL,
    concessions_received TEXT NOT NULL,
    next_steps           TEXT NOT NULL DEFAULT '',
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stakeholder_comments (
    id          TEXT PRIMARY KEY,
    deal_id     TEXT NOT NULL REFERENCES deals(id) ON DELETE CASCADE,
    author_id   TEXT NOT NULL REFERENCES users(id),
    author_name TEXT NOT NULL,
    comment     TEXT NOT NULL,
    section     TEXT NOT NULL DEFAULT 'general',
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_deals_owner ON deals(owner_id);
CREATE INDEX IF NOT EXISTS idx_comments_deal ON stakeholder_comments(deal_id, created_at);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
"#;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

pub(crate) fn uuid_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_err(idx, e))
}

pub(crate) fn parsed_col<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion_err(idx, e))
}

pub(crate) fn json_col<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_err(idx, e))
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Translate a SQLite constraint failure into a domain error; pass everything
/// else through unchanged.
pub(crate) fn map_constraint(err: rusqlite::Error, message: &str) -> NegoError {
    match &err {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            NegoError::Constraint(message.to_string())
        }
        _ => NegoError::Sqlite(err),
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------
