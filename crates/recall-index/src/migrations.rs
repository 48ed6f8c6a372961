// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary by
//! `embed_migrations!` and applied whenever the database is opened.

use recall_core::RecallError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::database::map_tr_err;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations on the connection's worker thread.
///
/// Refinery tracks applied versions in `refinery_schema_history`.
pub async fn run_migrations(conn: &Connection) -> Result<(), RecallError> {
    let outcome = conn
        .call(|conn| -> Result<Result<usize, String>, rusqlite::Error> {
            Ok(embedded::migrations::runner()
                .run(conn)
                .map(|report| report.applied_migrations().len())
                .map_err(|e| e.to_string()))
        })
        .await
        .map_err(map_tr_err)?;

    let applied = outcome.map_err(RecallError::store_unavailable)?;
    debug!(applied, "index migrations complete");
    Ok(())
}
