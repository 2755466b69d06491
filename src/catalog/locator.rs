use regex::Regex;
use std::collections::BTreeMap;

use super::language::Language;
use super::layout::{DatasetLayout, PathTemplate};
use crate::error::DatasetError;
use crate::storage::backend::ObjectMeta;
use crate::storage::client::ChunkStore;

/// A dataset object resolved to a concrete storage path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPart {
    /// 1-based part index. A single file is part 1 of one.
    pub index: u32,
    pub meta: ObjectMeta,
}

impl LocatedPart {
    pub fn path(&self) -> &str {
        &self.meta.path
    }

    pub fn file_name(&self) -> &str {
        self.meta.file_name()
    }
}

/// Resolves `(language, part)` requests against a [`DatasetLayout`].
pub struct DatasetLocator {
    store: ChunkStore,
}

impl DatasetLocator {
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Tries the layout's candidates in order and returns the first object
    /// that exists.
    ///
    /// A whole-dataset file answers part 1 only; finding it for a higher
    /// part means the dataset has no such part.
    pub async fn locate(
        &self,
        layout: &DatasetLayout,
        lang: Language,
        part: u32,
    ) -> Result<LocatedPart, DatasetError> {
        if part == 0 {
            return Err(DatasetError::InvalidPart(part.to_string()));
        }

        for candidate in layout.candidates(lang, part) {
            tracing::debug!("Checking {} for {} part {}", candidate.path, lang, part);

            let Some(meta) = self.store.head(&candidate.path).await? else {
                continue;
            };

            if candidate.whole && part > 1 {
                tracing::debug!("{} holds all of {}; no part {}", meta.path, lang, part);
                break;
            }

            tracing::debug!("Resolved {} part {} to {}", lang, part, meta.path);
            return Ok(LocatedPart { index: part, meta });
        }

        Err(DatasetError::PartNotFound { lang, part })
    }

    /// Enumerates every part of a dataset in ascending part order.
    ///
    /// Folders are searched in layout order and the first folder holding any
    /// matching object is used on its own; objects from different folders are
    /// never combined. A single file in that folder is returned alone.
    pub async fn list_parts(
        &self,
        layout: &DatasetLayout,
        lang: Language,
    ) -> Result<Vec<LocatedPart>, DatasetError> {
        let single = compile(layout.single.as_ref(), lang)?;
        let indexed = compile(layout.part.as_ref(), lang)?;

        for folder in &layout.folders {
            let folder = folder.render(lang, None).unwrap_or_default();
            if let Some(parts) = self
                .scan_folder(lang, &folder, single.as_ref(), indexed.as_ref())
                .await?
            {
                return Ok(parts);
            }
        }

        for (folder, name) in &layout.fallbacks {
            let folder = folder.render(lang, None).unwrap_or_default();
            let indexed = compile(Some(name), lang)?;
            if let Some(parts) = self.scan_folder(lang, &folder, None, indexed.as_ref()).await? {
                return Ok(parts);
            }
        }

        Err(DatasetError::DatasetNotFound {
            lang,
            label: layout.label,
        })
    }

    async fn scan_folder(
        &self,
        lang: Language,
        folder: &str,
        single: Option<&Regex>,
        indexed: Option<&Regex>,
    ) -> Result<Option<Vec<LocatedPart>>, DatasetError> {
        let objects = self.store.list(folder).await?;

        let mut found: BTreeMap<u32, LocatedPart> = BTreeMap::new();
        for meta in objects {
            let name = meta.file_name();

            if single.is_some_and(|re| re.is_match(name)) {
                tracing::debug!("Found single file {} for {}", meta.path, lang);
                return Ok(Some(vec![LocatedPart { index: 1, meta }]));
            }

            let index = indexed
                .and_then(|re| re.captures(name))
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok());

            match index {
                Some(0) => tracing::warn!("Ignoring zero-indexed part {}", meta.path),
                Some(index) => {
                    found.entry(index).or_insert(LocatedPart { index, meta });
                }
                None => {}
            }
        }

        if found.is_empty() {
            return Ok(None);
        }

        let parts: Vec<LocatedPart> = found.into_values().collect();
        warn_on_gaps(lang, folder, &parts);
        tracing::debug!("Found {} part(s) for {} in '{}'", parts.len(), lang, folder);
        Ok(Some(parts))
    }
}

fn compile(template: Option<&PathTemplate>, lang: Language) -> Result<Option<Regex>, DatasetError> {
    template
        .map(|t| t.matcher(lang))
        .transpose()
        .map_err(|e| DatasetError::Internal(e.to_string()))
}

fn warn_on_gaps(lang: Language, folder: &str, parts: &[LocatedPart]) {
    for (expected, part) in (1u32..).zip(parts) {
        if part.index != expected {
            tracing::warn!(
                "Parts for {} in '{}' are not contiguous: expected part {}, found {}",
                lang,
                folder,
                expected,
                part.index
            );
            return;
        }
    }
}
