use futures::future::join_all;
use std::sync::Arc;

use super::types::{ChunkEntry, ChunkManifest, PartInfo, SqliteMeta, iso_millis};
use crate::catalog::language::Language;
use crate::catalog::layout::DatasetLayout;
use crate::catalog::locator::{DatasetLocator, LocatedPart};
use crate::error::DatasetError;
use crate::storage::backend::ObjectMeta;

/// Describes what a client can download, without touching object bodies
/// (apart from the small chunk manifest).
pub struct DatasetInfoService {
    locator: Arc<DatasetLocator>,
}

impl DatasetInfoService {
    pub fn new(locator: Arc<DatasetLocator>) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &DatasetLocator {
        &self.locator
    }

    /// Parts of a dataset, in the order the record cache concatenates them.
    ///
    /// Size and timestamp come from the listing; objects the listing did not
    /// describe fully are looked up individually.
    pub async fn list_parts(
        &self,
        layout: &DatasetLayout,
        lang: Language,
    ) -> Result<Vec<PartInfo>, DatasetError> {
        let parts = self.locator.list_parts(layout, lang).await?;

        let mut infos = Vec::with_capacity(parts.len());
        for part in parts {
            let meta = self.complete_meta(part).await?;
            infos.push(part_info(&meta));
        }

        Ok(infos)
    }

    /// Loads `chunks_info.json` and stamps each chunk with the modification
    /// time of its object, when that object can be found.
    pub async fn chunk_manifest(&self, lang: Language) -> Result<ChunkManifest, DatasetError> {
        let located = self
            .locator
            .locate(&DatasetLayout::chunk_manifest(), lang, 1)
            .await?;
        let fetched = self.locator.store().fetch(located.path()).await?;

        let mut manifest: ChunkManifest =
            serde_json::from_slice(&fetched.bytes).map_err(|e| DatasetError::DatasetCorrupt {
                path: located.path().to_string(),
                reason: format!("invalid chunk manifest: {e}"),
            })?;

        tracing::info!(
            "Loaded chunk manifest {} ({} chunks)",
            located.path(),
            manifest.chunks.len()
        );

        let chunks = std::mem::take(&mut manifest.chunks);
        manifest.chunks = join_all(chunks.into_iter().map(|chunk| self.stamp_chunk(lang, chunk))).await;

        Ok(manifest)
    }

    pub async fn sqlite_meta(&self, lang: Language) -> Result<SqliteMeta, DatasetError> {
        let located = self
            .locator
            .locate(&DatasetLayout::sqlite(), lang, 1)
            .await?;
        let info = part_info(&located.meta);

        Ok(SqliteMeta {
            exists: true,
            size: info.size,
            modified_at: info.modified_at,
            modified_timestamp: info.modified_timestamp,
        })
    }

    async fn complete_meta(&self, part: LocatedPart) -> Result<ObjectMeta, DatasetError> {
        if part.meta.size.is_some() && part.meta.last_modified.is_some() {
            return Ok(part.meta);
        }

        let head = self.locator.store().head(part.path()).await?;
        Ok(match head {
            Some(head) => ObjectMeta {
                size: part.meta.size.or(head.size),
                last_modified: part.meta.last_modified.or(head.last_modified),
                path: part.meta.path,
            },
            None => part.meta,
        })
    }

    async fn stamp_chunk(&self, lang: Language, mut chunk: ChunkEntry) -> ChunkEntry {
        match self
            .locator
            .locate(&DatasetLayout::chunks(), lang, chunk.part)
            .await
        {
            Ok(located) => {
                if let Some(at) = located.meta.last_modified {
                    chunk.modified_at = Some(iso_millis(at));
                    chunk.modified_timestamp = Some(at.timestamp_millis());
                }
            }
            Err(e) => tracing::warn!("No metadata for {} chunk {}: {}", lang, chunk.part, e),
        }
        chunk
    }
}

fn part_info(meta: &ObjectMeta) -> PartInfo {
    PartInfo {
        file_name: meta.file_name().to_string(),
        size: meta.size,
        modified_at: meta.last_modified.map(iso_millis),
        modified_timestamp: meta.last_modified.map(|at| at.timestamp_millis()),
    }
}
