//! Dataset Layouts
//!
//! A layout describes, as plain data, where a dataset's objects may live
//! and how they are named. The locator walks the candidates a layout
//! produces; adding a naming convention means editing a layout, not the
//! locator.
//!
//! Templates understand three placeholders:
//! - `{lang}`: canonical language code (`us`)
//! - `{storage_lang}`: storage alias (`en` for `us`)
//! - `{part}`: 1-based part index

use regex::Regex;

use super::language::Language;
use crate::storage::backend::join_path;

const PART_PLACEHOLDER: &str = "{part}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn has_part(&self) -> bool {
        self.0.contains(PART_PLACEHOLDER)
    }

    fn render_lang(&self, lang: Language) -> String {
        self.0
            .replace("{storage_lang}", lang.storage_code())
            .replace("{lang}", lang.code())
    }

    /// Renders the template. Returns `None` when it needs a part index and
    /// none was given.
    pub fn render(&self, lang: Language, part: Option<u32>) -> Option<String> {
        let rendered = self.render_lang(lang);

        match part {
            Some(part) => Some(rendered.replace(PART_PLACEHOLDER, &part.to_string())),
            None if self.has_part() => None,
            None => Some(rendered),
        }
    }

    /// Anchored regex matching rendered file names, with the part index (if
    /// any) in capture group 1.
    pub fn matcher(&self, lang: Language) -> Result<Regex, regex::Error> {
        let pattern = self
            .render_lang(lang)
            .split(PART_PLACEHOLDER)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"(\d+)");

        Regex::new(&format!("^{pattern}$"))
    }
}

/// One object path to try when locating a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    /// The object holds the whole dataset rather than a single part.
    pub whole: bool,
}

/// Naming conventions for one kind of dataset.
///
/// Within a folder the single file and the part-indexed files are
/// alternatives: when the single file exists it is the whole dataset and
/// part files beside it are ignored.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    /// Used in not-found messages: "`{label}` not found".
    pub label: &'static str,
    /// Canonical single-file name.
    pub single: Option<PathTemplate>,
    /// Part-indexed file name; must contain `{part}`.
    pub part: Option<PathTemplate>,
    /// Folders to search, highest priority first. `""` is the bucket root.
    pub folders: Vec<PathTemplate>,
    /// `(folder, part name)` pairs tried after every folder above.
    pub fallbacks: Vec<(PathTemplate, PathTemplate)>,
}

impl DatasetLayout {
    /// Gzip JSON record parts: `us/us.json.gz`, `us/us_part2.json.gz`, ...
    pub fn json() -> Self {
        Self {
            label: "JSON files",
            single: Some(PathTemplate::new("{lang}.json.gz")),
            part: Some(PathTemplate::new("{lang}_part{part}.json.gz")),
            folders: vec![
                PathTemplate::new("{lang}"),
                PathTemplate::new(""),
                PathTemplate::new("json/{lang}"),
            ],
            fallbacks: Vec::new(),
        }
    }

    /// Legacy binary chunks produced by the SQLite splitter.
    pub fn chunks() -> Self {
        Self {
            label: "Chunks",
            single: None,
            part: Some(PathTemplate::new("foods_{lang}_chunk{part}.part.gz")),
            folders: vec![
                PathTemplate::new("{storage_lang}"),
                PathTemplate::new(""),
                PathTemplate::new("chunks/{storage_lang}"),
            ],
            // Older uploads named root chunks after the storage alias
            fallbacks: vec![(
                PathTemplate::new(""),
                PathTemplate::new("foods_{storage_lang}_chunk{part}.part.gz"),
            )],
        }
    }

    /// `chunks_info.json` manifest written next to the legacy chunks.
    pub fn chunk_manifest() -> Self {
        Self {
            label: "Chunks info",
            single: Some(PathTemplate::new("chunks_info.json")),
            part: None,
            folders: vec![
                PathTemplate::new("{storage_lang}"),
                PathTemplate::new(""),
                PathTemplate::new("chunks/{storage_lang}"),
                PathTemplate::new("{storage_lang}/chunks"),
            ],
            fallbacks: Vec::new(),
        }
    }

    /// Whole-file SQLite databases for the smaller datasets.
    pub fn sqlite() -> Self {
        Self {
            label: "File",
            single: Some(PathTemplate::new("foods_{lang}.sqlite")),
            part: None,
            folders: vec![
                PathTemplate::new("{lang}"),
                PathTemplate::new(""),
                PathTemplate::new("sqlite"),
            ],
            fallbacks: Vec::new(),
        }
    }

    /// Object paths to try for `part`, in priority order, without duplicates.
    ///
    /// Within each folder the single-file name comes first for every part:
    /// if it exists, `part` resolves to it (part 1) or to nothing (part 2+).
    pub fn candidates(&self, lang: Language, part: u32) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut push = |path: String, whole: bool| {
            if !candidates.iter().any(|c| c.path == path) {
                candidates.push(Candidate { path, whole });
            }
        };

        for folder in &self.folders {
            let folder = folder.render(lang, None).unwrap_or_default();

            if let Some(name) = self.single.as_ref().and_then(|t| t.render(lang, None)) {
                push(join_path(&folder, &name), true);
            }
            if let Some(name) = self.part.as_ref().and_then(|t| t.render(lang, Some(part))) {
                push(join_path(&folder, &name), false);
            }
        }

        for (folder, name) in &self.fallbacks {
            let folder = folder.render(lang, None).unwrap_or_default();
            if let Some(name) = name.render(lang, Some(part)) {
                push(join_path(&folder, &name), false);
            }
        }

        candidates
    }
}
