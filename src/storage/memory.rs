//! In-memory backend for tests.
//!
//! Objects live in a `BTreeMap`; every operation is counted so tests can
//! assert how often the store was touched (cache hits, single-flight).

use async_compression::tokio::write::GzipEncoder;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use tokio::io::AsyncWriteExt;

use super::backend::{ObjectMeta, ObjectStream, StorageBackend, join_path};
use super::error::{StoreError, StoreResult};

struct StoredObject {
    bytes: Bytes,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    opens: Mutex<HashMap<String, usize>>,
    heads: AtomicUsize,
    lists: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, bytes: impl Into<Bytes>) {
        self.insert_at(path, bytes, None);
    }

    pub fn insert_at(
        &self,
        path: &str,
        bytes: impl Into<Bytes>,
        last_modified: Option<DateTime<Utc>>,
    ) {
        self.objects.write().unwrap().insert(
            path.to_string(),
            StoredObject {
                bytes: bytes.into(),
                last_modified,
            },
        );
    }

    /// Makes every following call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn open_count(&self, path: &str) -> usize {
        self.opens.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_opens(&self) -> usize {
        self.opens.lock().unwrap().values().sum()
    }

    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn list_count(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    fn check_available(&self, operation: &'static str, path: &str) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(operation, path, "store offline"));
        }
        Ok(())
    }

    fn meta(path: &str, object: &StoredObject) -> ObjectMeta {
        ObjectMeta {
            path: path.to_string(),
            size: Some(object.bytes.len() as u64),
            last_modified: object.last_modified,
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn head(&self, path: &str) -> StoreResult<Option<ObjectMeta>> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        self.check_available("head", path)?;

        let objects = self.objects.read().unwrap();
        Ok(objects.get(path).map(|object| Self::meta(path, object)))
    }

    async fn list(&self, folder: &str) -> StoreResult<Vec<ObjectMeta>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.check_available("list", folder)?;

        let objects = self.objects.read().unwrap();
        Ok(objects
            .iter()
            .filter(|(path, _)| {
                let name = path.rsplit('/').next().unwrap_or(path);
                **path == join_path(folder, name)
            })
            .map(|(path, object)| Self::meta(path, object))
            .collect())
    }

    async fn get_range(&self, path: &str, range: Range<u64>) -> StoreResult<Bytes> {
        self.check_available("range read", path)?;

        let objects = self.objects.read().unwrap();
        let object = objects.get(path).ok_or_else(|| StoreError::not_found(path))?;
        let size = object.bytes.len() as u64;

        if range.start > range.end || range.end > size {
            return Err(StoreError::InvalidRange {
                path: path.to_string(),
                start: range.start,
                end: range.end,
                size,
            });
        }

        Ok(object.bytes.slice(range.start as usize..range.end as usize))
    }

    async fn open(&self, path: &str) -> StoreResult<ObjectStream> {
        *self
            .opens
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;
        self.check_available("download", path)?;

        // Yield so concurrent callers interleave with the load in progress.
        tokio::task::yield_now().await;

        let objects = self.objects.read().unwrap();
        let object = objects.get(path).ok_or_else(|| StoreError::not_found(path))?;

        // Two chunks, so consumers see a multi-chunk body.
        let mid = object.bytes.len() / 2;
        let chunks = vec![
            Ok(object.bytes.slice(..mid)),
            Ok(object.bytes.slice(mid..)),
        ];

        Ok(ObjectStream {
            meta: Self::meta(path, object),
            body: stream::iter(chunks).boxed(),
        })
    }
}

pub async fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzipEncoder::new(Vec::new());
    encoder.write_all(data).await.unwrap();
    encoder.shutdown().await.unwrap();
    encoder.into_inner()
}

pub async fn gzip_json(value: &serde_json::Value) -> Vec<u8> {
    gzip(&serde_json::to_vec(value).unwrap()).await
}
