use futures::stream::BoxStream;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::{AppError, AppResult};

/// Storage ids carrying this tag reference the foreign object backend.
pub const FOREIGN_PREFIX: &str = "object::";
/// Per-user variant of the foreign tag; the remainder is the username.
pub const FOREIGN_USER_PREFIX: &str = "object::user:";
/// Mimetype the catalog uses for directory placeholder rows.
pub const DIRECTORY_MIMETYPE: &str = "httpd/unix-directory";

// Deepest paths first: stamping a parent's mtime must happen after its
// children are created, since mkdir inside a directory updates it.
const DIRECTORY_SQL: &str = "SELECT st.id AS storage_id, fc.fileid, fc.path, fc.storage_mtime \
     FROM filecache fc \
     JOIN storages st ON st.numeric_id = fc.storage \
     JOIN mimetypes mt ON mt.id = fc.mimetype \
     WHERE st.id LIKE 'object::%' AND mt.mimetype = 'httpd/unix-directory' \
     ORDER BY fc.path DESC";

const CONTENT_SQL: &str = "SELECT st.id AS storage_id, fc.fileid, fc.path, fc.storage_mtime \
     FROM filecache fc \
     JOIN storages st ON st.numeric_id = fc.storage \
     JOIN mimetypes mt ON mt.id = fc.mimetype \
     WHERE st.id LIKE 'object::%' AND mt.mimetype != 'httpd/unix-directory' \
     ORDER BY fc.path";

/// Decoded storage-id tag.
///
/// The catalog stores these as prefix-tagged strings; they are decoded once
/// here so the structure and transfer phases never re-parse raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageId {
    /// Shared foreign storage, e.g. `object::store:bucket1`.
    ForeignShared { tail: String },
    /// Per-user foreign storage, e.g. `object::user:alice`.
    ForeignPerUser { user: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageIdError {
    #[error("storage id `{0}` does not carry the foreign-backend tag")]
    NotForeign(String),
    #[error("per-user storage id `{0}` has an empty user segment")]
    EmptyUser(String),
}

impl StorageId {
    pub fn parse(raw: &str) -> Result<Self, StorageIdError> {
        if let Some(user) = raw.strip_prefix(FOREIGN_USER_PREFIX) {
            if user.is_empty() {
                return Err(StorageIdError::EmptyUser(raw.to_string()));
            }
            return Ok(StorageId::ForeignPerUser {
                user: user.to_string(),
            });
        }
        match raw.strip_prefix(FOREIGN_PREFIX) {
            Some(tail) => Ok(StorageId::ForeignShared {
                tail: tail.to_string(),
            }),
            None => Err(StorageIdError::NotForeign(raw.to_string())),
        }
    }

    pub fn user(&self) -> Option<&str> {
        match self {
            StorageId::ForeignPerUser { user } => Some(user),
            StorageId::ForeignShared { .. } => None,
        }
    }
}

/// One catalog row under management. Whether it is a directory placeholder
/// or file content is carried by which enumeration produced it.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub storage: StorageId,
    pub object_id: i64,
    pub relative_path: String,
    pub mtime: i64,
}

impl CatalogEntry {
    /// Decode a row from either enumeration. A missing column is a catalog
    /// contract violation; an undecodable storage id is a per-row defect
    /// the caller records against that row alone.
    pub fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let raw_storage: String = row
            .try_get("storage_id")
            .map_err(|err| AppError::from(err).with_context("column", "storage_id"))?;
        let object_id: i64 = row
            .try_get("fileid")
            .map_err(|err| AppError::from(err).with_context("column", "fileid"))?;
        let relative_path: String = row
            .try_get("path")
            .map_err(|err| AppError::from(err).with_context("column", "path"))?;
        let mtime: i64 = row
            .try_get("storage_mtime")
            .map_err(|err| AppError::from(err).with_context("column", "storage_mtime"))?;

        let storage = StorageId::parse(&raw_storage).map_err(|err| {
            AppError::new("CATALOG/STORAGE_ID", err.to_string())
                .with_context("fileid", object_id.to_string())
        })?;

        Ok(CatalogEntry {
            storage,
            object_id,
            relative_path,
            mtime,
        })
    }
}

/// Stream the directory placeholder rows stored in the foreign backend.
///
/// Single-pass cursor; issue a fresh call to re-iterate. Stream errors are
/// fatal to the run since the catalog is the source of truth.
pub fn directory_entries(pool: &SqlitePool) -> BoxStream<'_, sqlx::Result<SqliteRow>> {
    sqlx::query(DIRECTORY_SQL).fetch(pool)
}

/// Stream the content rows stored in the foreign backend.
pub fn content_entries(pool: &SqlitePool) -> BoxStream<'_, sqlx::Result<SqliteRow>> {
    sqlx::query(CONTENT_SQL).fetch(pool)
}
