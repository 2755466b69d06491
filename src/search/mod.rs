//! Search Module
//!
//! Ranked substring/prefix search over a language's cached records.
//!
//! ## Overview
//! Each record is scored against the normalized query by comparing its name
//! (fixed per language) and brand. Matches are ranked by score, calorie
//! presence and dataset order, then paginated.
//!
//! ## Submodules
//! - **`query`**: query normalization and the clamped page window.
//! - **`engine`**: scoring, stable ranking and pagination.
//! - **`handlers`**: the `GET /datasets/:lang/search` endpoint.
//! - **`types`**: request/response shapes.

pub mod engine;
pub mod handlers;
pub mod query;
pub mod types;
