//! Document store for taskdeck data.
//!
//! Persistence is deliberately simple: one JSON record per user
//! (`{taskList, lastUpdated}`), read and replaced as a whole. SQLite holds the
//! records at `~/.local/share/taskdeck/store.db` (override with `TD_DATA_DIR`).
//!
//! Each record carries a monotonically increasing `version`. `replace` is a
//! compare-and-swap on that version, so two processes editing the same user's
//! document cannot silently overwrite each other; the loser gets
//! [`Error::Conflict`] and re-runs the command.

use crate::models::TaskDocument;
use crate::{Error, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory (used by tests).
pub const DATA_DIR_ENV: &str = "TD_DATA_DIR";

/// A document read together with the version it had in the store.
///
/// The version must be passed back to [`Storage::replace`] unchanged.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub doc: TaskDocument,
    pub version: i64,
}

/// Store manager holding the SQLite connection.
pub struct Storage {
    /// Root directory for taskdeck data
    pub root: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open the store at the default data directory, creating it if needed.
    pub fn open() -> Result<Self> {
        Self::open_with_data_dir(&resolve_data_dir()?)
    }

    /// Open the store rooted at an explicit directory (dependency injection
    /// for tests).
    pub fn open_with_data_dir(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("store.db");
        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            root: data_dir.to_path_buf(),
            conn,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                user_id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                version INTEGER NOT NULL,
                last_updated TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Read the user's document. A user with no record yet gets an empty
    /// document at version 0.
    pub fn read(&self, user_id: &str) -> Result<VersionedDocument> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT body, version FROM documents WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((body, version)) => {
                let doc: TaskDocument = serde_json::from_str(&body)?;
                Ok(VersionedDocument { doc, version })
            }
            None => Ok(VersionedDocument {
                doc: TaskDocument::default(),
                version: 0,
            }),
        }
    }

    /// Replace the user's whole document, compare-and-swap on `expected`.
    ///
    /// Returns the new version. [`Error::Conflict`] means another process
    /// replaced the document since it was read.
    pub fn replace(
        &self,
        user_id: &str,
        doc: &TaskDocument,
        expected: i64,
    ) -> Result<i64> {
        let now = Utc::now();
        let mut stamped = doc.clone();
        stamped.last_updated = Some(now);
        let body = serde_json::to_string(&stamped)?;
        let now_str = now.to_rfc3339();

        if expected == 0 {
            let inserted = self.conn.execute(
                "INSERT INTO documents (user_id, body, version, last_updated)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT(user_id) DO NOTHING",
                params![user_id, body, now_str],
            )?;
            if inserted == 1 {
                return Ok(1);
            }
            // A record appeared between read and replace.
            return Err(Error::Conflict);
        }

        let updated = self.conn.execute(
            "UPDATE documents
             SET body = ?1, version = version + 1, last_updated = ?2
             WHERE user_id = ?3 AND version = ?4",
            params![body, now_str, user_id, expected],
        )?;
        if updated == 1 {
            Ok(expected + 1)
        } else {
            Err(Error::Conflict)
        }
    }

    /// Delete the user's record entirely (`auth logout --purge`).
    pub fn delete(&self, user_id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM documents WHERE user_id = ?1", params![user_id])?;
        Ok(n == 1)
    }
}

/// Resolve the data directory: `TD_DATA_DIR` env > XDG data dir.
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(base.join("taskdeck"))
}
