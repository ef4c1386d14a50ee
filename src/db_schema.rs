use rusqlite::Connection;

/// Creates the idempotence table if it is not there yet. One row per media
/// file, keyed by its path string.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS updated_files (
            filename TEXT PRIMARY KEY,
            updated_at TEXT,
            metadata_hash TEXT
        );",
    )
}
