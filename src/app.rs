//! Service wiring: backend selection, shared services and the HTTP router.

use anyhow::{Context, Result};
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::locator::DatasetLocator;
use crate::config::{Config, StorageConfig};
use crate::datasets::handlers::{
    handle_chunks_info, handle_download_chunk, handle_download_part, handle_download_sqlite,
    handle_list_parts, handle_sqlite_meta,
};
use crate::datasets::info::DatasetInfoService;
use crate::records::cache::{CachedDataset, RecordCache};
use crate::search::handlers::handle_dataset_search;
use crate::storage::backend::StorageBackend;
use crate::storage::client::ChunkStore;
use crate::storage::local::LocalBackend;
use crate::storage::supabase::SupabaseBackend;
use crate::upstream::handlers::handle_food_search;
use crate::upstream::openfoodfacts::OpenFoodFactsClient;

/// Process-wide services shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub cache: Arc<RecordCache>,
    pub info: Arc<DatasetInfoService>,
    pub upstream: Arc<OpenFoodFactsClient>,
}

impl AppServices {
    pub fn new(store: ChunkStore, upstream: OpenFoodFactsClient) -> Self {
        let locator = Arc::new(DatasetLocator::new(store));

        Self {
            cache: Arc::new(RecordCache::new(locator.clone())),
            info: Arc::new(DatasetInfoService::new(locator)),
            upstream: Arc::new(upstream),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store = ChunkStore::new(build_backend(&config.storage, config.store_timeout)?);
        tracing::info!("Using {} storage backend", store.backend_name());

        let upstream = OpenFoodFactsClient::new(config.openfoodfacts_url.clone(), config.store_timeout)
            .context("Failed to create OpenFoodFacts client")?;

        Ok(Self::new(store, upstream))
    }
}

pub fn build_backend(storage: &StorageConfig, timeout: Duration) -> Result<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match storage {
        StorageConfig::Local { data_dir } => {
            if !data_dir.is_dir() {
                tracing::warn!("Data directory {} does not exist", data_dir.display());
            }
            Arc::new(LocalBackend::new(data_dir.clone()))
        }
        StorageConfig::Supabase {
            url,
            bucket,
            service_key,
        } => Arc::new(
            SupabaseBackend::new(url, bucket, service_key, timeout)
                .context("Failed to create Supabase storage client")?,
        ),
    };

    Ok(backend)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached: Vec<CachedDataset>,
}

async fn handle_health(Extension(cache): Extension<Arc<RecordCache>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cached: cache.cached_languages(),
    })
}

pub fn build_router(services: &AppServices) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::IF_NONE_MATCH])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(handle_health))
        .route("/datasets/:lang/parts", get(handle_list_parts))
        .route("/datasets/:lang/parts/:part", get(handle_download_part))
        .route("/datasets/:lang/search", get(handle_dataset_search))
        .route("/datasets/:lang/chunks/info", get(handle_chunks_info))
        .route("/datasets/:lang/chunks/:part", get(handle_download_chunk))
        .route("/datasets/:lang/sqlite", get(handle_download_sqlite))
        .route("/datasets/:lang/sqlite/meta", get(handle_sqlite_meta))
        .route("/food-search", get(handle_food_search))
        .layer(Extension(services.cache.clone()))
        .layer(Extension(services.info.clone()))
        .layer(Extension(services.upstream.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Logs what the record cache holds every `every`.
pub async fn report_cache_stats(cache: Arc<RecordCache>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let cached = cache.cached_languages();
        let records: usize = cached.iter().map(|c| c.records).sum();

        tracing::info!("Cache stats: {} language(s), {} records", cached.len(), records);
        for entry in cached {
            tracing::info!("  - {}: {} records", entry.lang, entry.records);
        }
    }
}
