use std::path::Path;

use filetime::FileTime;

use crate::{AppError, AppResult};

/// Stamp the catalog's logical modification time onto a destination path.
pub fn set_unix_mtime(path: &Path, secs: i64) -> AppResult<()> {
    let mtime = FileTime::from_unix_time(secs, 0);
    filetime::set_file_mtime(path, mtime).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "set_mtime")
            .with_context("path", path.display().to_string())
    })
}

/// Read back a path's modification time as unix seconds.
pub fn unix_mtime(path: &Path) -> AppResult<i64> {
    let metadata = std::fs::metadata(path).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "read_mtime")
            .with_context("path", path.display().to_string())
    })?;
    Ok(FileTime::from_last_modification_time(&metadata).unix_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_and_reads_back_mtime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("stamped");
        std::fs::write(&file, b"x").expect("write");

        set_unix_mtime(&file, 1_000).expect("set mtime");
        assert_eq!(unix_mtime(&file).expect("read mtime"), 1_000);
    }
}
