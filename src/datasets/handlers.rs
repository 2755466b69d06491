use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;

use super::download::{GZIP_CONTENT_TYPE, SQLITE_CONTENT_TYPE, stream_download};
use super::info::DatasetInfoService;
use super::types::{ChunkInfoResponse, MissingBody, PartsResponse};
use crate::catalog::language::Language;
use crate::catalog::layout::DatasetLayout;
use crate::error::DatasetError;

fn parse_part(raw: &str) -> Result<u32, DatasetError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DatasetError::InvalidPart(raw.to_string()))
}

/// `GET /datasets/:lang/parts`
pub async fn handle_list_parts(
    Path(lang): Path<String>,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Json<PartsResponse>, DatasetError> {
    let lang: Language = lang.parse()?;
    let parts = info.list_parts(&DatasetLayout::json(), lang).await?;

    tracing::debug!("Listed {} part(s) for {}", parts.len(), lang);
    Ok(Json(PartsResponse {
        lang,
        total_parts: parts.len(),
        parts,
    }))
}

/// `GET /datasets/:lang/parts/:part`
pub async fn handle_download_part(
    Path((lang, part)): Path<(String, String)>,
    headers: HeaderMap,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Response, DatasetError> {
    download(&info, &DatasetLayout::json(), &lang, &part, GZIP_CONTENT_TYPE, &headers).await
}

/// `GET /datasets/:lang/chunks/:part`
pub async fn handle_download_chunk(
    Path((lang, part)): Path<(String, String)>,
    headers: HeaderMap,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Response, DatasetError> {
    download(&info, &DatasetLayout::chunks(), &lang, &part, GZIP_CONTENT_TYPE, &headers).await
}

/// `GET /datasets/:lang/sqlite`
pub async fn handle_download_sqlite(
    Path(lang): Path<String>,
    headers: HeaderMap,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Response, DatasetError> {
    download(&info, &DatasetLayout::sqlite(), &lang, "1", SQLITE_CONTENT_TYPE, &headers).await
}

async fn download(
    info: &DatasetInfoService,
    layout: &DatasetLayout,
    lang: &str,
    part: &str,
    content_type: &'static str,
    headers: &HeaderMap,
) -> Result<Response, DatasetError> {
    let lang: Language = lang.parse()?;
    let part = parse_part(part)?;

    let located = info.locator().locate(layout, lang, part).await?;
    stream_download(info.locator().store(), &located, content_type, headers).await
}

/// `GET /datasets/:lang/chunks/info`
pub async fn handle_chunks_info(
    Path(lang): Path<String>,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Response, DatasetError> {
    let lang: Language = lang.parse()?;

    match info.chunk_manifest(lang).await {
        Ok(manifest) => Ok(Json(ChunkInfoResponse {
            exists: true,
            manifest,
        })
        .into_response()),
        Err(e) if e.is_not_found() => {
            tracing::warn!("No chunk manifest for {}", lang);
            Ok((StatusCode::NOT_FOUND, Json(MissingBody::new("Chunks info not found"))).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /datasets/:lang/sqlite/meta`
pub async fn handle_sqlite_meta(
    Path(lang): Path<String>,
    Extension(info): Extension<Arc<DatasetInfoService>>,
) -> Result<Response, DatasetError> {
    let lang: Language = lang.parse()?;

    match info.sqlite_meta(lang).await {
        Ok(meta) => Ok(Json(meta).into_response()),
        Err(e) if e.is_not_found() => {
            Ok((StatusCode::NOT_FOUND, Json(MissingBody::new("File not found"))).into_response())
        }
        Err(e) => Err(e),
    }
}
