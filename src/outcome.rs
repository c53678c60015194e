use serde::{Deserialize, Serialize};

/// Per-phase accounting. Exactly one record per catalog entry: an entry
/// either succeeds or fails, never both and never twice, even when several
/// steps for the same entry go wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub attempted: u64,
    pub failures: u64,
    /// Identifiers of the failed items, for operator triage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

impl PhaseStats {
    pub fn record_success(&mut self) {
        self.attempted += 1;
    }

    pub fn record_failure(&mut self, item: impl Into<String>) {
        self.attempted += 1;
        self.failures += 1;
        self.failed.push(item.into());
    }

    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Process-wide accumulator for one run. Created at run start, mutated by
/// the phases, read once at the go/no-go decision, then discarded; a failed
/// run is not resumable from this state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    pub structure: PhaseStats,
    pub transfer: PhaseStats,
}
