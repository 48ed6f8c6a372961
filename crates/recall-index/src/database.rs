// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All database work is serialized through tokio-rusqlite's single background
//! thread. Clone the [`Database`] handle rather than opening new connections.

use std::path::Path;

use recall_core::RecallError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Convert tokio-rusqlite errors into [`RecallError::StoreUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> RecallError {
    RecallError::store_unavailable(e)
}

/// Handle to the index database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, apply PRAGMAs, and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RecallError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(RecallError::store_unavailable)?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(RecallError::store_unavailable)?;
        let db = Self::prepare(conn, wal_mode).await?;
        debug!(path, wal_mode, "index database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and ephemeral runs.
    pub async fn open_in_memory() -> Result<Self, RecallError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(RecallError::store_unavailable)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: Connection, wal_mode: bool) -> Result<Self, RecallError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        migrations::run_migrations(&conn).await?;
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), RecallError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_in_memory_runs_migrations() {
        let db = Database::open_in_memory().await.unwrap();
        let tables = table_names(&db).await;
        assert!(tables.contains(&"collections".to_string()));
        assert!(tables.contains(&"documents".to_string()));
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/index.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());
        db.checkpoint().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.db");
        let path = path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        let db = Database::open(path, true).await.unwrap();
        assert_eq!(table_names(&db).await.len(), 3);
    }
}
