use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};

use crate::{AppError, AppResult};

/// Open a pool on the metadata catalog.
///
/// The catalog is the source of truth for the migration and must already
/// exist; a missing database is surfaced, never created.
pub async fn open_catalog_pool(path: &Path) -> AppResult<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Off);

    let pool = SqlitePool::connect_with(opts).await.map_err(|err| {
        AppError::from(err)
            .with_context("operation", "open_catalog")
            .with_context("path", path.display().to_string())
    })?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(&pool)
        .await
        .ok();

    tracing::info!(
        target: "decant",
        event = "catalog_opened",
        path = %path.display(),
    );

    Ok(pool)
}
