//! Storage backend trait.
//!
//! [`StorageBackend`] abstracts the object store that holds the dataset
//! parts, so the locator and the record cache can run against a local
//! directory in development, Supabase storage in production, and an
//! in-memory map in tests.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream::BoxStream};
use std::ops::Range;

use super::error::StoreResult;

/// Metadata for one stored object.
///
/// Backends fill in what they know; `size` and `last_modified` are optional
/// because not every listing API reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMeta {
    /// Full object path, `/`-separated, without a leading slash.
    pub path: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Byte stream of an object body.
pub type ByteStream = BoxStream<'static, StoreResult<Bytes>>;

/// An object opened for streaming.
///
/// Dropping the stream aborts the underlying read.
pub struct ObjectStream {
    pub meta: ObjectMeta,
    pub body: ByteStream,
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns `None` if the object does not exist.
    async fn head(&self, path: &str) -> StoreResult<Option<ObjectMeta>>;

    /// Lists the objects directly inside `folder` (`""` is the root).
    ///
    /// Sub-folders are not included. A missing folder yields an empty list.
    async fn list(&self, folder: &str) -> StoreResult<Vec<ObjectMeta>>;

    /// Reads a byte range (start inclusive, end exclusive).
    async fn get_range(&self, path: &str, range: Range<u64>) -> StoreResult<Bytes>;

    /// Opens an object as a byte stream.
    async fn open(&self, path: &str) -> StoreResult<ObjectStream>;

    /// Reads a whole object.
    async fn get(&self, path: &str) -> StoreResult<(Bytes, ObjectMeta)> {
        let ObjectStream { meta, mut body } = self.open(path).await?;

        let mut buf = BytesMut::with_capacity(meta.size.unwrap_or(0) as usize);
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }

        Ok((buf.freeze(), meta))
    }
}

/// Joins a folder and a file name into an object path.
pub fn join_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    let name = name.trim_start_matches('/');

    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}
