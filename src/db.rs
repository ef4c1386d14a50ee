use chrono::Utc;
use rusqlite::{params, OptionalExtension, Result as SqlResult, Row};
use thiserror::Error;

use crate::db_pool::DbPool;

/// Store failures cannot be told apart from "not yet applied" safely, so the
/// caller treats them as fatal for the affected pair.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// One row of the idempotence table: the hash of the payload last written
/// into a file's metadata.
#[derive(Debug, Clone)]
pub struct UpdateRecord {
    pub filename: String,
    pub updated_at: String,
    pub metadata_hash: String,
}

impl UpdateRecord {
    pub fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(UpdateRecord {
            filename: row.get(0)?,
            updated_at: row.get(1)?,
            metadata_hash: row.get(2)?,
        })
    }
}

/// True iff `filename` has a record whose stored hash equals `hash`.
pub fn was_applied(pool: &DbPool, filename: &str, hash: &str) -> Result<bool, StoreError> {
    let conn = pool.get()?;
    let stored: Option<String> = conn
        .query_row(
            "SELECT metadata_hash FROM updated_files WHERE filename = ?",
            [filename],
            |row| row.get(0),
        )
        .optional()?;
    Ok(stored.as_deref() == Some(hash))
}

/// Upsert: replaces any existing record for `filename`, last write wins.
pub fn record_applied(pool: &DbPool, filename: &str, hash: &str) -> Result<(), StoreError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO updated_files (filename, updated_at, metadata_hash)
         VALUES (?1, ?2, ?3)",
        params![filename, Utc::now().to_rfc3339(), hash],
    )?;
    Ok(())
}

pub fn find_record(pool: &DbPool, filename: &str) -> Result<Option<UpdateRecord>, StoreError> {
    let conn = pool.get()?;
    let record = conn
        .query_row(
            "SELECT filename, updated_at, metadata_hash FROM updated_files WHERE filename = ?",
            [filename],
            UpdateRecord::from_row,
        )
        .optional()?;
    Ok(record)
}
