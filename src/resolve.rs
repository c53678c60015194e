use std::path::{Component, Path, PathBuf};

use crate::catalog::StorageId;
use crate::{AppError, AppResult};

pub const ERR_PATH_ESCAPE: &str = "RESOLVE/PATH_ESCAPE";

/// Map a catalog row to its destination filesystem path.
///
/// Shared foreign rows land at `data_root/relative`; per-user rows at
/// `data_root/<user>/relative`. This is the single piece of path-mapping
/// logic; both the structure and transfer phases go through it so the two
/// can never disagree on where an entry lives.
///
/// Relative paths with rooted or parent components are rejected so a
/// hostile catalog row cannot write outside the destination root.
pub fn resolve(data_root: &Path, storage: &StorageId, relative: &str) -> AppResult<PathBuf> {
    let relative_path = Path::new(relative);
    if relative_path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(
            AppError::new(ERR_PATH_ESCAPE, "Relative path escapes the destination root.")
                .with_context("relative_path", relative.to_string()),
        );
    }

    let mut full = data_root.to_path_buf();
    if let Some(user) = storage.user() {
        full.push(user);
    }
    full.push(relative_path);
    Ok(full)
}
