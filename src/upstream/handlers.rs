use axum::extract::Query;
use axum::{Extension, Json};
use std::sync::Arc;

use super::openfoodfacts::{OpenFoodFactsClient, UpstreamError, clamp_limit};
use super::types::{FoodSearchParams, FoodSearchResponse};
use crate::search::query::MIN_QUERY_CHARS;

/// `GET /food-search`
pub async fn handle_food_search(
    Query(params): Query<FoodSearchParams>,
    Extension(client): Extension<Arc<OpenFoodFactsClient>>,
) -> Result<Json<FoodSearchResponse>, UpstreamError> {
    let query = params.query();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(FoodSearchResponse {
            items: Vec::new(),
            total: 0,
        }));
    }

    let limit = clamp_limit(params.limit());
    let items = client.search(query, params.language(), limit).await?;

    tracing::info!("OpenFoodFacts returned {} item(s) for '{}'", items.len(), query);
    Ok(Json(FoodSearchResponse {
        total: items.len(),
        items,
    }))
}
