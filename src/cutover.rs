use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{AppError, AppResult};

// `length('object::user:')` keeps the strip offset tied to the literal
// instead of a hand-counted constant.
const PER_USER_REWRITE: &str = "UPDATE storages \
     SET id = 'home::' || substr(id, length('object::user:') + 1) \
     WHERE id LIKE 'object::user:%'";

const SHARED_REWRITE: &str = "UPDATE storages SET id = ?1 WHERE id LIKE 'object::%'";

/// The rewrite rule applied to catalog storage pointers, computed once from
/// the destination root and applied exactly once after transfer succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoverSpec {
    local_storage_id: String,
}

impl CutoverSpec {
    pub fn new(data_root: &Path) -> Self {
        Self {
            local_storage_id: format!("local::{}/", data_root.display()),
        }
    }

    /// Storage id the remaining shared foreign rows collapse into.
    pub fn local_storage_id(&self) -> &str {
        &self.local_storage_id
    }
}

/// Rows rewritten per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoverStats {
    pub per_user_rows: u64,
    pub shared_rows: u64,
}

/// Rewrite the catalog's storage pointers to the local backend.
///
/// This is the point of no return. Both rewrite rules run inside one
/// catalog transaction, so a failure in either leaves the catalog pointing
/// wholly at the foreign backend. Per-user rows become `home::<user>`;
/// the remaining foreign rows collapse into the single local row. Each
/// rule is idempotent: a second application matches zero rows.
pub async fn apply(pool: &SqlitePool, spec: &CutoverSpec) -> AppResult<CutoverStats> {
    let mut tx = pool.begin().await.map_err(|err| {
        AppError::from(err).with_context("operation", "cutover_begin")
    })?;

    let per_user_rows = sqlx::query(PER_USER_REWRITE)
        .execute(&mut *tx)
        .await
        .map_err(|err| AppError::from(err).with_context("operation", "cutover_per_user"))?
        .rows_affected();

    let shared_rows = sqlx::query(SHARED_REWRITE)
        .bind(spec.local_storage_id())
        .execute(&mut *tx)
        .await
        .map_err(|err| AppError::from(err).with_context("operation", "cutover_shared"))?
        .rows_affected();

    tx.commit().await.map_err(|err| {
        AppError::from(err).with_context("operation", "cutover_commit")
    })?;

    tracing::info!(
        target: "decant",
        event = "cutover_applied",
        per_user_rows,
        shared_rows,
        local_storage_id = %spec.local_storage_id(),
    );

    Ok(CutoverStats {
        per_user_rows,
        shared_rows,
    })
}
