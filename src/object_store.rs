use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::{AppError, AppResult};

/// Byte stream handed back by a fetch.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Derive the stable URN key under which content lives in the foreign
/// backend.
pub fn object_urn(object_id: i64) -> String {
    format!("urn:oid:{object_id}")
}

/// Read access to the foreign object backend.
///
/// The migration only ever reads from the source; nothing in this crate
/// deletes or rewrites foreign objects, which is what makes a failed run
/// safely retryable against an emptied destination. Networked backends
/// implement this seam outside the crate.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, object_id: i64) -> AppResult<ObjectReader>;
}

/// Object store backed by a local directory of URN-named files, as produced
/// by mounting or mirroring a bucket.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    bucket: PathBuf,
}

impl FsObjectStore {
    pub fn new(bucket: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    pub fn key_path(&self, object_id: i64) -> PathBuf {
        self.bucket.join(object_urn(object_id))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn fetch(&self, object_id: i64) -> AppResult<ObjectReader> {
        let path = self.key_path(object_id);
        let file = tokio::fs::File::open(&path).await.map_err(|err| {
            AppError::from(err)
                .with_context("operation", "object_fetch")
                .with_context("key", object_urn(object_id))
        })?;
        Ok(Box::pin(file))
    }
}
