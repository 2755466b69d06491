use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;

use super::engine::search;
use super::query::{Pagination, normalize_query};
use super::types::{SearchParams, SearchResponse};
use crate::catalog::language::Language;
use crate::error::DatasetError;
use crate::records::cache::RecordCache;

/// `GET /datasets/:lang/search`
///
/// Load failures degrade to an empty page; only an unsupported language is
/// reported as an error.
pub async fn handle_dataset_search(
    Path(lang): Path<String>,
    Query(params): Query<SearchParams>,
    Extension(cache): Extension<Arc<RecordCache>>,
) -> Result<Response, DatasetError> {
    let lang: Language = lang.parse()?;
    let page = Pagination::from_params(params.limit.as_deref(), params.offset.as_deref());
    let query = params.q.unwrap_or_default();

    if normalize_query(&query).is_none() {
        return Ok(empty_page(page));
    }

    let records = match cache.get_records(lang).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Search over {} degraded to empty result: {}", lang, e);
            return Ok(empty_page(page));
        }
    };

    let results = search(&records, &query, lang, page.limit, page.offset);

    Ok(Json(SearchResponse {
        total: results.len(),
        results,
        limit: page.limit,
        offset: page.offset,
    })
    .into_response())
}

fn empty_page(page: Pagination) -> Response {
    Json(SearchResponse {
        results: Vec::new(),
        total: 0,
        limit: page.limit,
        offset: page.offset,
    })
    .into_response()
}
