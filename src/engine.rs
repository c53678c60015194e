use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::cutover::{self, CutoverSpec, CutoverStats};
use crate::object_store::ObjectStore;
use crate::outcome::MigrationOutcome;
use crate::structure::build_structure;
use crate::transfer::transfer_contents;
use crate::{AppError, AppResult};

pub const ERR_DESTINATION_UNREADABLE: &str = "PREFLIGHT/DESTINATION_UNREADABLE";

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// All content transferred and the catalog cut over.
    Complete,
    /// Destination root was not empty; nothing was mutated.
    BlockedPreflight { entries: u64 },
    /// Transfer left failures behind; the catalog was not touched and the
    /// destination is left populated for inspection.
    BlockedTransfer { failures: u64 },
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunStatus::Complete)
    }

    /// Process exit code for the caller's automation: preflight aborts and
    /// transfer blocks are distinct non-zero outcomes.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::BlockedPreflight { .. } => 2,
            RunStatus::BlockedTransfer { .. } => 3,
        }
    }
}

/// What one run did, for operator-facing reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub status: RunStatus,
    pub outcome: MigrationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutover: Option<CutoverStats>,
}

/// Orchestrates the phase sequence:
/// PREFLIGHT -> STRUCTURE -> TRANSFER -> DECIDE -> CUTOVER.
///
/// Backend handles are passed in explicitly; the engine owns no global
/// state and a fresh engine is built per run.
pub struct MigrationEngine<'a> {
    pool: &'a SqlitePool,
    store: &'a dyn ObjectStore,
    data_root: PathBuf,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(pool: &'a SqlitePool, store: &'a dyn ObjectStore, data_root: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            store,
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Count the entries currently in the destination root. Anything above
    /// zero blocks the run before any mutation. An unreadable or missing
    /// destination is fatal: the run cannot establish its precondition.
    pub fn preflight(&self) -> AppResult<u64> {
        let entries = std::fs::read_dir(&self.data_root).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "preflight_list")
                .with_context("path", self.data_root.display().to_string())
        })?;

        let mut count = 0u64;
        for entry in entries {
            entry.map_err(|err| {
                AppError::new(ERR_DESTINATION_UNREADABLE, err.to_string())
                    .with_context("path", self.data_root.display().to_string())
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Run the migration to a terminal state.
    ///
    /// Returns `Ok` with a blocked or complete report; `Err` only for the
    /// fatal classes: unreadable destination, catalog query failure, and
    /// cutover failure. A cutover error means the filesystem and catalog
    /// may disagree and manual reconciliation is required.
    pub async fn run(&self) -> AppResult<MigrationReport> {
        let entries = self.preflight()?;
        if entries > 0 {
            tracing::error!(
                target: "decant",
                event = "preflight_blocked",
                path = %self.data_root.display(),
                entries,
            );
            return Ok(MigrationReport {
                status: RunStatus::BlockedPreflight { entries },
                outcome: MigrationOutcome::default(),
                cutover: None,
            });
        }

        let mut outcome = MigrationOutcome::default();

        tracing::info!(target: "decant", event = "structure_phase_start");
        build_structure(self.pool, &self.data_root, &mut outcome.structure).await?;
        tracing::info!(
            target: "decant",
            event = "structure_phase_done",
            attempted = outcome.structure.attempted,
            failures = outcome.structure.failures,
        );

        // Structure failures do not gate transfer: the affected paths fail
        // again below, where they do gate the cutover.
        tracing::info!(target: "decant", event = "transfer_phase_start");
        transfer_contents(self.pool, self.store, &self.data_root, &mut outcome.transfer).await?;
        tracing::info!(
            target: "decant",
            event = "transfer_phase_done",
            attempted = outcome.transfer.attempted,
            failures = outcome.transfer.failures,
        );

        if !outcome.transfer.is_clean() {
            let failures = outcome.transfer.failures;
            tracing::error!(
                target: "decant",
                event = "transfer_blocked",
                failures,
            );
            return Ok(MigrationReport {
                status: RunStatus::BlockedTransfer { failures },
                outcome,
                cutover: None,
            });
        }

        let spec = CutoverSpec::new(&self.data_root);
        let stats = cutover::apply(self.pool, &spec).await.map_err(|err| {
            tracing::error!(
                target: "decant",
                event = "cutover_failed",
                local_storage_id = %spec.local_storage_id(),
                error = %err,
            );
            err.with_context("operation", "cutover")
        })?;

        tracing::info!(target: "decant", event = "migration_complete");
        Ok(MigrationReport {
            status: RunStatus::Complete,
            outcome,
            cutover: Some(stats),
        })
    }
}
