use std::path::Path;

use futures::TryStreamExt;
use sqlx::SqlitePool;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::catalog::{self, CatalogEntry};
use crate::object_store::{object_urn, ObjectStore};
use crate::outcome::PhaseStats;
use crate::resolve::resolve;
use crate::util::set_unix_mtime;
use crate::{AppError, AppResult};

/// Phase 2: stream each content object from the foreign backend into its
/// resolved destination path and stamp the catalog's modification time.
///
/// The central failure-isolation contract lives here: a batch of N entries
/// with K failures still attempts all N, and each failure is logged with
/// its object key and recorded exactly once. The source object is never
/// deleted or modified. Ancestor directories are NOT created here; a parent
/// missing because phase 1 failed surfaces as a transfer failure, which is
/// what gates the cutover.
pub async fn transfer_contents(
    pool: &SqlitePool,
    store: &dyn ObjectStore,
    data_root: &Path,
    stats: &mut PhaseStats,
) -> AppResult<()> {
    let mut rows = catalog::content_entries(pool);
    while let Some(row) = rows
        .try_next()
        .await
        .map_err(|err| AppError::from(err).with_context("operation", "transfer_enumeration"))?
    {
        let entry = match CatalogEntry::from_row(&row) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    target: "decant",
                    event = "transfer_row_undecodable",
                    error = %err,
                );
                stats.record_failure("<undecodable row>");
                continue;
            }
        };

        let key = object_urn(entry.object_id);
        match transfer_object(store, data_root, &entry).await {
            Ok(bytes) => {
                tracing::debug!(
                    target: "decant",
                    event = "transfer_entry_done",
                    key = %key,
                    bytes,
                );
                stats.record_success();
            }
            Err(err) => {
                tracing::warn!(
                    target: "decant",
                    event = "transfer_entry_failed",
                    key = %key,
                    relative_path = %entry.relative_path,
                    error = %err,
                );
                stats.record_failure(key);
            }
        }
    }
    Ok(())
}

async fn transfer_object(
    store: &dyn ObjectStore,
    data_root: &Path,
    entry: &CatalogEntry,
) -> AppResult<u64> {
    let path = resolve(data_root, &entry.storage, &entry.relative_path)?;
    let mut reader = store.fetch(entry.object_id).await?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "transfer_open")
                .with_context("path", path.display().to_string())
        })?;

    let bytes = tokio::io::copy(&mut reader, &mut file).await.map_err(|err| {
        AppError::from(err)
            .with_context("operation", "transfer_stream")
            .with_context("path", path.display().to_string())
    })?;

    file.flush().await.map_err(|err| {
        AppError::from(err)
            .with_context("operation", "transfer_flush")
            .with_context("path", path.display().to_string())
    })?;
    drop(file);

    set_unix_mtime(&path, entry.mtime)?;
    Ok(bytes)
}
