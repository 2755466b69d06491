//! Supabase storage backend.
//!
//! Talks to the Supabase storage REST API with the service-role key:
//!
//! - `GET|HEAD {url}/storage/v1/object/{bucket}/{path}` for object reads
//! - `POST {url}/storage/v1/object/list/{bucket}` for folder listings
//!
//! The API answers `400` for some missing objects, so both `400` and `404`
//! are treated as "not found".

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, LAST_MODIFIED, RANGE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

use super::backend::{ObjectMeta, ObjectStream, StorageBackend, join_path};
use super::error::{StoreError, StoreResult};

const LIST_PAGE_SIZE: usize = 1000;

pub struct SupabaseBackend {
    http_client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Deserialize)]
struct ListedObject {
    name: String,
    /// `null` for folders.
    id: Option<String>,
    updated_at: Option<String>,
    created_at: Option<String>,
    metadata: Option<ListedMetadata>,
}

#[derive(Deserialize)]
struct ListedMetadata {
    size: Option<u64>,
}

impl SupabaseBackend {
    pub fn new(
        base_url: &str,
        bucket: &str,
        service_key: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::unavailable("client setup", base_url, e))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn send(
        &self,
        operation: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> StoreResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::unavailable(operation, path, e))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Err(StoreError::not_found(path)),
            status if status.is_success() => Ok(response),
            status => Err(StoreError::unavailable(
                operation,
                path,
                format!("unexpected status {status}"),
            )),
        }
    }
}

fn meta_from_headers(path: &str, headers: &HeaderMap) -> ObjectMeta {
    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|dt| dt.with_timezone(&Utc));

    ObjectMeta {
        path: path.to_string(),
        size,
        last_modified,
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl StorageBackend for SupabaseBackend {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn head(&self, path: &str) -> StoreResult<Option<ObjectMeta>> {
        let request = self.http_client.head(self.object_url(path));

        match self.send("head", path, request).await {
            Ok(response) => Ok(Some(meta_from_headers(path, response.headers()))),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, folder: &str) -> StoreResult<Vec<ObjectMeta>> {
        let folder = folder.trim_matches('/');
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let mut objects = Vec::new();
        let mut offset = 0;

        loop {
            let body = ListRequest {
                prefix: folder,
                limit: LIST_PAGE_SIZE,
                offset,
                sort_by: SortBy {
                    column: "name",
                    order: "asc",
                },
            };
            let request = self.http_client.post(&url).json(&body);

            let page: Vec<ListedObject> = match self.send("list", folder, request).await {
                Ok(response) => response
                    .json()
                    .await
                    .map_err(|e| StoreError::unavailable("list", folder, e))?,
                Err(StoreError::NotFound { .. }) => Vec::new(),
                Err(e) => return Err(e),
            };

            let page_len = page.len();
            objects.extend(page.into_iter().filter(|item| item.id.is_some()).map(
                |item| ObjectMeta {
                    path: join_path(folder, &item.name),
                    size: item.metadata.and_then(|m| m.size),
                    last_modified: parse_timestamp(
                        item.updated_at.as_deref().or(item.created_at.as_deref()),
                    ),
                },
            ));

            if page_len < LIST_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        Ok(objects)
    }

    async fn get_range(&self, path: &str, range: Range<u64>) -> StoreResult<Bytes> {
        if range.start >= range.end {
            return Ok(Bytes::new());
        }

        let request = self
            .http_client
            .get(self.object_url(path))
            .header(RANGE, format!("bytes={}-{}", range.start, range.end - 1));
        let response = self.send("range read", path, request).await?;

        response
            .bytes()
            .await
            .map_err(|e| StoreError::unavailable("range read", path, e))
    }

    async fn open(&self, path: &str) -> StoreResult<ObjectStream> {
        let request = self.http_client.get(self.object_url(path));
        let response = self.send("download", path, request).await?;
        let meta = meta_from_headers(path, response.headers());

        let owned_path = path.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| StoreError::unavailable("download", &owned_path, e)))
            .boxed();

        Ok(ObjectStream { meta, body })
    }
}
