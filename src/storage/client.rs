use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::ops::Range;
use std::sync::Arc;

use super::backend::{ByteStream, ObjectMeta, StorageBackend};
use super::error::StoreResult;

/// Read-only client over a [`StorageBackend`].
///
/// Fills in metadata the backend could not provide: the size falls back to
/// the payload length and the modification time to the time of the request.
#[derive(Clone)]
pub struct ChunkStore {
    backend: Arc<dyn StorageBackend>,
}

/// A whole object read into memory.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub path: String,
    pub bytes: Bytes,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// An object opened for streaming to a client.
pub struct ObjectDownload {
    pub path: String,
    /// Unknown when the backend did not report a length.
    pub size: Option<u64>,
    pub last_modified: DateTime<Utc>,
    pub body: ByteStream,
}

impl ChunkStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn head(&self, path: &str) -> StoreResult<Option<ObjectMeta>> {
        self.backend.head(path).await
    }

    pub async fn list(&self, folder: &str) -> StoreResult<Vec<ObjectMeta>> {
        self.backend.list(folder).await
    }

    pub async fn fetch(&self, path: &str) -> StoreResult<FetchedObject> {
        let (bytes, meta) = self.backend.get(path).await?;
        tracing::debug!("Fetched {} ({} bytes) from {}", path, bytes.len(), self.backend.name());

        Ok(FetchedObject {
            path: meta.path,
            size: meta.size.unwrap_or(bytes.len() as u64),
            last_modified: meta.last_modified.unwrap_or_else(Utc::now),
            bytes,
        })
    }

    pub async fn fetch_range(&self, path: &str, range: Range<u64>) -> StoreResult<Bytes> {
        self.backend.get_range(path, range).await
    }

    pub async fn download(&self, path: &str) -> StoreResult<ObjectDownload> {
        let stream = self.backend.open(path).await?;

        Ok(ObjectDownload {
            path: stream.meta.path,
            size: stream.meta.size,
            last_modified: stream.meta.last_modified.unwrap_or_else(Utc::now),
            body: stream.body,
        })
    }
}
