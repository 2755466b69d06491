//! Food Dataset Service Library
//!
//! This library crate defines the modules behind the dataset server binary (`main.rs`).
//!
//! ## Architecture Modules
//! The service is composed of loosely coupled subsystems, leaf first:
//!
//! - **`storage`**: The object store abstraction. A `StorageBackend` trait with local
//!   filesystem and Supabase storage implementations, wrapped by the `ChunkStore` client.
//! - **`catalog`**: Languages and dataset layouts. The `DatasetLocator` resolves a
//!   language and part number to a concrete object by probing naming conventions in order.
//! - **`records`**: Decompression and the process-wide record cache, loaded once per
//!   language and shared by every search.
//! - **`search`**: Scored prefix/substring search with stable ranking and pagination.
//! - **`datasets`**: Discovery and raw download endpoints (parts, chunks, SQLite files).
//! - **`upstream`**: OpenFoodFacts search proxy for products outside the offline datasets.
//!
//! `app` wires these into an Axum router; `config` reads the environment.

pub mod app;
pub mod catalog;
pub mod config;
pub mod datasets;
pub mod error;
pub mod records;
pub mod search;
pub mod storage;
pub mod upstream;
