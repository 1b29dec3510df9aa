//! SQLite-backed key/value storage.
//!
//! Every piece of persisted state (sessions, achievements, goals, weekly
//! stats) lives as one JSON blob under its logical key in the `kv` table.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, KeyValueStore};
use crate::error::StorageError;

/// SQLite database holding the key/value table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/breathwork.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("breathwork.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(())
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("sessions").unwrap().is_none());

        db.set("sessions", b"[]").unwrap();
        assert_eq!(db.get("sessions").unwrap().as_deref(), Some(&b"[]"[..]));

        db.set("sessions", b"[1]").unwrap();
        assert_eq!(db.get("sessions").unwrap().as_deref(), Some(&b"[1]"[..]));

        db.remove("sessions").unwrap();
        assert!(db.get("sessions").unwrap().is_none());
    }

    #[test]
    fn file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breathwork.db");
        Database::open_at(&path).unwrap().set("goals_active", b"[]").unwrap();
        let reopened = Database::open_at(&path).unwrap();
        assert_eq!(reopened.get("goals_active").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn keys_are_listed() {
        let db = Database::open_memory().unwrap();
        db.set("weekly_stats", b"{}").unwrap();
        db.set("achievements", b"[]").unwrap();
        assert_eq!(db.keys().unwrap(), vec!["achievements", "weekly_stats"]);
    }
}
