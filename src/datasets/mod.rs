//! Dataset Info Module
//!
//! HTTP surface for dataset discovery and raw downloads.
//!
//! ## Responsibilities
//! - **Discovery**: part listings, the legacy chunk manifest and SQLite metadata.
//! - **Downloads**: streamed part, chunk and SQLite bodies with cache validators.
//!
//! ## Submodules
//! - **`info`**: [`info::DatasetInfoService`], built on the catalog locator.
//! - **`download`**: response headers, ETags and conditional requests.
//! - **`handlers`**: Axum handlers for the `/datasets/:lang/...` routes.
//! - **`types`**: camelCase wire types.

pub mod download;
pub mod handlers;
pub mod info;
pub mod types;
