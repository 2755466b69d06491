use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::decode::decode_part;
use super::types::FoodRecord;
use crate::catalog::language::Language;
use crate::catalog::layout::DatasetLayout;
use crate::catalog::locator::DatasetLocator;
use crate::error::DatasetError;

/// Shared, immutable record list for one language.
pub type RecordList = Arc<Vec<FoodRecord>>;

/// Process-wide cache of parsed records, keyed by language.
///
/// Each language owns a `OnceCell`. Concurrent first requests for the same
/// language wait on that cell, so a dataset is downloaded and decoded once
/// (single-flight). A failed load leaves the cell empty: nothing partial is
/// ever cached, and the next caller retries. Entries are never evicted.
pub struct RecordCache {
    locator: Arc<DatasetLocator>,
    layout: DatasetLayout,
    entries: DashMap<Language, Arc<OnceCell<RecordList>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedDataset {
    pub lang: Language,
    pub records: usize,
}

impl RecordCache {
    pub fn new(locator: Arc<DatasetLocator>) -> Self {
        Self {
            locator,
            layout: DatasetLayout::json(),
            entries: DashMap::new(),
        }
    }

    /// Returns all records for `lang`, in ascending part order.
    pub async fn get_records(&self, lang: Language) -> Result<RecordList, DatasetError> {
        let cell = self.entries.entry(lang).or_default().value().clone();

        cell.get_or_try_init(|| self.load(lang)).await.cloned()
    }

    /// Cached records, without triggering a load.
    pub fn cached(&self, lang: Language) -> Option<RecordList> {
        self.entries
            .get(&lang)
            .and_then(|entry| entry.value().get().cloned())
    }

    pub fn cached_languages(&self) -> Vec<CachedDataset> {
        let mut stats: Vec<CachedDataset> = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry.value().get().map(|records| CachedDataset {
                    lang: *entry.key(),
                    records: records.len(),
                })
            })
            .collect();

        stats.sort_by_key(|s| s.lang);
        stats
    }

    /// Loads the given languages one after another, logging failures.
    pub async fn warm(&self, langs: &[Language]) {
        for &lang in langs {
            match self.get_records(lang).await {
                Ok(records) => tracing::info!("Warmed {} ({} records)", lang, records.len()),
                Err(e) => tracing::error!("Failed to warm {}: {}", lang, e),
            }
        }
    }

    async fn load(&self, lang: Language) -> Result<RecordList, DatasetError> {
        let parts = self.locator.list_parts(&self.layout, lang).await?;
        tracing::info!("Loading {} part(s) for {}", parts.len(), lang);

        let mut records = Vec::new();
        for part in &parts {
            let fetched = self.locator.store().fetch(part.path()).await?;
            let batch = decode_part(part.path(), fetched.bytes).await?;

            tracing::debug!("Loaded {} records from {}", batch.len(), part.path());
            records.extend(batch);
        }

        tracing::info!("Total {} records loaded for {}", records.len(), lang);
        Ok(Arc::new(records))
    }
}
