// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, so the
//! `Database` handle is the one writer for the whole process. Query modules
//! take `&Database` and go through [`Database::connection`].

use std::path::Path;

use standup_core::StandupError;
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Convert a tokio-rusqlite error into `StandupError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StandupError {
    StandupError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    wal_mode: bool,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply PRAGMAs and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, StandupError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StandupError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StandupError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| embedded::migrations::runner().run(conn).map(|_| ()))
            .await
            .map_err(|e: tokio_rusqlite::Error<refinery::Error>| StandupError::Storage {
                source: format!("migration failed: {e}").into(),
            })?;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn, wal_mode })
    }

    /// The underlying connection. Every statement goes through its `call`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Result<(), StandupError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Fold the WAL back into the main file. No-op outside WAL mode.
    pub async fn checkpoint(&self) -> Result<(), StandupError> {
        if !self.wal_mode {
            return Ok(());
        }
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/schema.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' \
                     AND name NOT LIKE 'refinery%' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(
            tables,
            vec!["daily_records", "followup_sessions", "pending_updates"]
        );
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();
        Database::open(path, false).await.unwrap();
        let db = Database::open(path, false).await.unwrap();
        db.ping().await.unwrap();
        db.checkpoint().await.unwrap();
    }
}
