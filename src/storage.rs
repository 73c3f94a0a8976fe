//! SQLite helpers shared by the stores.
//!
//! Every store owns a single connection behind a `parking_lot::Mutex`. Nested
//! documents (profile sections, post likes and comments) are kept as JSON text
//! columns next to the few columns that need indexing.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{types::Type, Connection, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConnection = Arc<Mutex<Connection>>;

/// Open (or create) an on-disk database.
pub fn open<P: AsRef<Path>>(path: P) -> Result<SharedConnection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        "#,
    )
    .context("Failed to configure database")?;

    // Each store holds its own connection to the same file
    conn.busy_timeout(Duration::from_secs(5))
        .context("Failed to set busy timeout")?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a private in-memory database (for testing).
pub fn open_in_memory() -> Result<SharedConnection> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn parse_document<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}
