//! Records Module
//!
//! Turns gzip JSON dataset parts into in-memory [`types::FoodRecord`] lists
//! and keeps them for the lifetime of the process.
//!
//! ## Submodules
//! - **`types`**: the stored JSON object plus the lowercased keys ranking reads.
//! - **`decode`**: gunzip and JSON parsing of one part.
//! - **`cache`**: per-language, single-flight, all-or-nothing record cache.

pub mod cache;
pub mod decode;
pub mod types;

#[cfg(test)]
mod tests;
