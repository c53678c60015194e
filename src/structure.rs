use std::path::Path;

use futures::TryStreamExt;
use sqlx::SqlitePool;

use crate::catalog::{self, CatalogEntry};
use crate::outcome::PhaseStats;
use crate::resolve::resolve;
use crate::util::set_unix_mtime;
use crate::{AppError, AppResult};

/// Phase 1: materialize the directory tree on the destination filesystem.
///
/// Idempotent per entry (`create_dir_all`), preserves the catalog's
/// modification times, and always runs the enumeration to exhaustion: a
/// per-entry failure is logged, recorded once in `stats`, and the loop
/// moves on. Only a catalog stream failure aborts the phase.
pub async fn build_structure(
    pool: &SqlitePool,
    data_root: &Path,
    stats: &mut PhaseStats,
) -> AppResult<()> {
    let mut rows = catalog::directory_entries(pool);
    while let Some(row) = rows
        .try_next()
        .await
        .map_err(|err| AppError::from(err).with_context("operation", "structure_enumeration"))?
    {
        let entry = match CatalogEntry::from_row(&row) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    target: "decant",
                    event = "structure_row_undecodable",
                    error = %err,
                );
                stats.record_failure(row_label(&row));
                continue;
            }
        };

        match materialize_directory(data_root, &entry).await {
            Ok(()) => stats.record_success(),
            Err(err) => {
                tracing::warn!(
                    target: "decant",
                    event = "structure_entry_failed",
                    relative_path = %entry.relative_path,
                    error = %err,
                );
                stats.record_failure(entry.relative_path.clone());
            }
        }
    }
    Ok(())
}

async fn materialize_directory(data_root: &Path, entry: &CatalogEntry) -> AppResult<()> {
    let path = resolve(data_root, &entry.storage, &entry.relative_path)?;
    tokio::fs::create_dir_all(&path).await.map_err(|err| {
        AppError::from(err)
            .with_context("operation", "structure_mkdir")
            .with_context("path", path.display().to_string())
    })?;
    set_unix_mtime(&path, entry.mtime)
}

fn row_label(row: &sqlx::sqlite::SqliteRow) -> String {
    use sqlx::Row;
    row.try_get::<String, _>("path")
        .unwrap_or_else(|_| "<undecodable row>".to_string())
}
