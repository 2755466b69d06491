use serde::{Deserialize, Serialize};

use crate::records::types::FoodRecord;

/// Raw query string of `GET /datasets/:lang/search`.
///
/// Numbers are kept as strings so malformed values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub results: Vec<&'a FoodRecord>,
    /// Number of items in this page, not the total match count.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}
