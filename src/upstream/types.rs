use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query string of `GET /food-search`. Both the long and the OpenFoodFacts
/// style parameter names are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct FoodSearchParams {
    pub query: Option<String>,
    pub q: Option<String>,
    pub language: Option<String>,
    pub lc: Option<String>,
    pub limit: Option<String>,
    pub page_size: Option<String>,
}

impl FoodSearchParams {
    pub fn query(&self) -> &str {
        self.query.as_deref().or(self.q.as_deref()).unwrap_or_default().trim()
    }

    pub fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .or(self.lc.as_deref())
            .map(str::trim)
            .filter(|lc| !lc.is_empty())
    }

    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref().or(self.page_size.as_deref())
    }
}

/// Subset of an OpenFoodFacts product we read.
#[derive(Debug, Default, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "_id")]
    pub object_id: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub serving_quantity: Option<Value>,
    #[serde(default)]
    pub nutriments: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_serving: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_100g: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FoodSearchResponse {
    pub items: Vec<FoodSearchItem>,
    pub total: usize,
}
