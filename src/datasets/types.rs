//! Dataset Info Types
//!
//! Wire shapes of the dataset discovery endpoints. Field names are camelCase
//! to match what the mobile client already parses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::language::Language;

/// One downloadable part of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo {
    pub file_name: String,
    pub size: Option<u64>,
    pub modified_at: Option<String>,
    pub modified_timestamp: Option<i64>,
}

/// Response of `GET /datasets/:lang/parts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsResponse {
    pub lang: Language,
    pub parts: Vec<PartInfo>,
    pub total_parts: usize,
}

/// `chunks_info.json` as written by the offline chunker.
///
/// Only `chunks[].part` is interpreted; everything else passes through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkManifest {
    #[serde(default)]
    pub chunks: Vec<ChunkEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkEntry {
    pub part: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /datasets/:lang/chunks/info`.
#[derive(Debug, Serialize)]
pub struct ChunkInfoResponse {
    pub exists: bool,
    #[serde(flatten)]
    pub manifest: ChunkManifest,
}

/// Response of `GET /datasets/:lang/sqlite/meta`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqliteMeta {
    pub exists: bool,
    pub size: Option<u64>,
    pub modified_at: Option<String>,
    pub modified_timestamp: Option<i64>,
}

/// 404 body of the endpoints that report `exists`.
#[derive(Debug, Serialize)]
pub struct MissingBody {
    pub error: &'static str,
    pub exists: bool,
}

impl MissingBody {
    pub fn new(error: &'static str) -> Self {
        Self {
            error,
            exists: false,
        }
    }
}

/// ISO-8601 with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// IMF-fixdate as used by `Last-Modified`, e.g. `Wed, 01 May 2024 09:30:00 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
