//! Upstream Food Search Module
//!
//! Proxies free-text product searches to OpenFoodFacts and maps the
//! results into a compact, kcal-normalized shape.

pub mod handlers;
pub mod openfoodfacts;
pub mod types;

#[cfg(test)]
mod tests;
