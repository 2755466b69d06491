//! Raw object downloads.
//!
//! Bodies are streamed straight from the backend without decompression.
//! Dropping the response (client gone) drops the backend stream with it.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use chrono::{DateTime, Utc};

use super::types::http_date;
use crate::catalog::locator::LocatedPart;
use crate::error::DatasetError;
use crate::storage::client::ChunkStore;

pub const GZIP_CONTENT_TYPE: &str = "application/gzip";
pub const SQLITE_CONTENT_TYPE: &str = "application/octet-stream";
pub const CACHE_CONTROL: &str = "public, max-age=86400";

/// Cache validators of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    pub last_modified: String,
}

impl Validators {
    pub fn new(last_modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            etag: format!("\"{}-{}\"", last_modified.timestamp_millis(), size),
            last_modified: http_date(last_modified),
        }
    }

    /// True when an `If-None-Match` header lists this ETag (or `*`).
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(header::IF_NONE_MATCH)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|tag| tag.trim().trim_start_matches("W/"))
            .any(|tag| tag == "*" || tag == self.etag)
    }
}

/// Streams a located object to the client with download and cache headers.
///
/// Answers `304 Not Modified` without opening the object when the client
/// already holds the current version.
pub async fn stream_download(
    store: &ChunkStore,
    located: &LocatedPart,
    content_type: &'static str,
    request_headers: &HeaderMap,
) -> Result<Response, DatasetError> {
    if let Some(last_modified) = located.meta.last_modified
        && let Some(size) = located.meta.size
    {
        let validators = Validators::new(last_modified, size);
        if validators.matches(request_headers) {
            tracing::debug!("{} not modified", located.path());
            return not_modified(&validators);
        }
    }

    let download = store.download(located.path()).await?;
    let size = download.size.or(located.meta.size);
    let validators = Validators::new(download.last_modified, size.unwrap_or(0));

    tracing::info!(
        "Streaming {} ({} bytes)",
        download.path,
        size.map_or_else(|| "unknown".to_string(), |s| s.to_string())
    );

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", located.file_name()),
        )
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::LAST_MODIFIED, validators.last_modified)
        .header(header::ETAG, validators.etag);

    if let Some(size) = size {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }

    builder
        .body(Body::from_stream(download.body))
        .map_err(|e| DatasetError::Internal(format!("failed to build response: {e}")))
}

fn not_modified(validators: &Validators) -> Result<Response, DatasetError> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::LAST_MODIFIED, validators.last_modified.as_str())
        .header(header::ETAG, validators.etag.as_str())
        .body(Body::empty())
        .map_err(|e| DatasetError::Internal(format!("failed to build response: {e}")))
}
