//! OpenFoodFacts search client.
//!
//! Free-text product lookup for foods missing from the offline datasets.
//! Products are reduced to the fields the client shows, with energy
//! normalized to kcal.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use super::types::{FoodSearchItem, Product, SearchEnvelope};
use crate::error::ErrorBody;

pub const DEFAULT_ENDPOINT: &str = "https://world.openfoodfacts.org/cgi/search.pl";
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 25;

const KJ_PER_KCAL: f64 = 4.184;
const FIELDS: &str = "id,product_name,generic_name,brands,serving_size,serving_quantity,nutriments";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Failed to fetch food data from upstream service.")]
    Status { status: u16, body: String },

    #[error("Unexpected error while fetching food data.")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = match &self {
            UpstreamError::Status { status, body } => {
                tracing::error!("OpenFoodFacts request failed: {} {}", status, body);
                StatusCode::BAD_GATEWAY
            }
            UpstreamError::Transport(e) => {
                tracing::error!("OpenFoodFacts request error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

pub struct OpenFoodFactsClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl OpenFoodFactsClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<FoodSearchItem>, UpstreamError> {
        let page_size = limit.to_string();
        let mut params = vec![
            ("search_terms", query),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", page_size.as_str()),
            ("fields", FIELDS),
        ];
        if let Some(lc) = language {
            params.push(("lc", lc));
        }

        tracing::debug!("OpenFoodFacts search '{}' (lc={:?}, limit={})", query, language, limit);

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SearchEnvelope = response.json().await?;
        Ok(envelope.products.into_iter().filter_map(map_product).collect())
    }
}

/// Page size for a raw `limit` value: unparsable or zero means the default,
/// anything else is clamped to `1..=MAX_LIMIT`.
pub fn clamp_limit(raw: Option<&str>) -> usize {
    let limit = raw
        .and_then(crate::search::query::parse_leading_int)
        .filter(|&n| n != 0)
        .unwrap_or(DEFAULT_LIMIT);

    limit.clamp(1, MAX_LIMIT) as usize
}

/// Reduces a product to a search item. Products without an id or a name
/// are dropped.
pub fn map_product(product: Product) -> Option<FoodSearchItem> {
    let id = product
        .id
        .as_ref()
        .and_then(id_string)
        .or_else(|| product.object_id.as_ref().and_then(id_string))?;

    let name = product
        .product_name
        .or(product.generic_name)
        .filter(|name| !name.is_empty())?;

    let nutriments = &product.nutriments;
    let calories_per_serving = extract_number(nutriments, &["energy-kcal_serving", "energy-kcal_value"])
        .or_else(|| kj_to_kcal(extract_number(nutriments, &["energy_serving", "energy_value"])));
    let calories_per_100g = extract_number(nutriments, &["energy-kcal_100g"])
        .or_else(|| kj_to_kcal(extract_number(nutriments, &["energy_100g"])));

    Some(FoodSearchItem {
        id,
        name,
        brand: primary_brand(product.brands.as_deref()),
        serving_size: product.serving_size,
        serving_quantity: product.serving_quantity.as_ref().and_then(number),
        calories_per_serving,
        calories_per_100g,
    })
}

/// First non-empty entry of a comma-separated brand list.
pub fn primary_brand(brands: Option<&str>) -> Option<String> {
    brands?
        .split(',')
        .map(str::trim)
        .find(|brand| !brand.is_empty())
        .map(str::to_string)
}

/// First key holding a number or a numeric string.
pub fn extract_number(nutriments: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| nutriments.get(*key).and_then(number))
}

pub fn kj_to_kcal(kj: Option<f64>) -> Option<f64> {
    kj.filter(|&kj| kj != 0.0).map(|kj| kj / KJ_PER_KCAL)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
}

/// Reads the longest numeric prefix, so `"250 kcal"` is 250.
fn parse_float_prefix(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);

    (1..=end)
        .rev()
        .find_map(|len| raw[..len].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}
