//! Key/value storage backing persisted client state.
//!
//! Values are opaque strings (JSON by convention). A missing key and a
//! removed key are indistinguishable.

use super::DbResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Reads one value by storage key.
pub fn kv_get(conn: &Connection, storage_key: &str) -> DbResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE storage_key = ?1;",
            [storage_key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// Inserts or replaces one value.
pub fn kv_set(conn: &Connection, storage_key: &str, value: &str) -> DbResult<()> {
    conn.execute(
        "INSERT INTO kv_store (storage_key, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT (storage_key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![storage_key, value],
    )?;
    Ok(())
}

/// Removes one value. Returns whether a row was deleted.
pub fn kv_remove(conn: &Connection, storage_key: &str) -> DbResult<bool> {
    let changed = conn.execute("DELETE FROM kv_store WHERE storage_key = ?1;", [storage_key])?;
    Ok(changed > 0)
}
