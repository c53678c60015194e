//! decant migrates a catalog-indexed file tree from an object-store-backed
//! layout onto a plain local filesystem. The metadata catalog stays the
//! single source of truth throughout: directory structure is rebuilt first,
//! content is transferred with per-item failure isolation, and only a fully
//! clean transfer unlocks the irreversible rewrite of the catalog's storage
//! pointers.

pub mod catalog;
pub mod cutover;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod object_store;
pub mod outcome;
pub mod resolve;
pub mod structure;
pub mod transfer;
pub mod util;

pub use engine::{MigrationEngine, MigrationReport, RunStatus};
pub use error::{AppError, AppResult};
pub use outcome::{MigrationOutcome, PhaseStats};
