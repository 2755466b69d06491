//! Filesystem backend.
//!
//! Serves objects from a directory on disk, e.g. `data/foodData`. Object
//! paths are interpreted relative to the root and may not escape it.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;

use super::backend::{ObjectMeta, ObjectStream, StorageBackend, join_path};
use super::error::{StoreError, StoreResult};

pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let mut resolved = self.root.clone();

        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(StoreError::InvalidPath {
                        path: path.to_string(),
                    });
                }
            }
        }

        Ok(resolved)
    }
}

fn meta_from_fs(path: &str, metadata: &std::fs::Metadata) -> ObjectMeta {
    ObjectMeta {
        path: path.to_string(),
        size: Some(metadata.len()),
        last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn head(&self, path: &str) -> StoreResult<Option<ObjectMeta>> {
        let full = self.resolve(path)?;

        match fs::metadata(&full).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(meta_from_fs(path, &metadata))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn list(&self, folder: &str) -> StoreResult<Vec<ObjectMeta>> {
        let full = self.resolve(folder)?;

        let mut dir = match fs::read_dir(&full).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut objects = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 file name in {:?}", full);
                continue;
            };
            objects.push(meta_from_fs(&join_path(folder, &name), &metadata));
        }

        objects.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(objects)
    }

    async fn get_range(&self, path: &str, range: Range<u64>) -> StoreResult<Bytes> {
        let full = self.resolve(path)?;
        let mut file = fs::File::open(&full)
            .await
            .map_err(|e| StoreError::from_io(path, e))?;
        let size = file.metadata().await?.len();

        if range.start > range.end || range.end > size {
            return Err(StoreError::InvalidRange {
                path: path.to_string(),
                start: range.start,
                end: range.end,
                size,
            });
        }

        file.seek(SeekFrom::Start(range.start)).await?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        file.read_exact(&mut buf).await?;

        Ok(Bytes::from(buf))
    }

    async fn open(&self, path: &str) -> StoreResult<ObjectStream> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full)
            .await
            .map_err(|e| StoreError::from_io(path, e))?;
        let metadata = file.metadata().await?;

        if !metadata.is_file() {
            return Err(StoreError::not_found(path));
        }

        let body = ReaderStream::new(file)
            .map(|chunk| chunk.map_err(StoreError::Io))
            .boxed();

        Ok(ObjectStream {
            meta: meta_from_fs(path, &metadata),
            body,
        })
    }
}
