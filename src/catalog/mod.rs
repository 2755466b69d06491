//! Dataset Catalog Module
//!
//! Maps a logical dataset request, a language plus an optional part number,
//! onto concrete objects in storage.
//!
//! ## Responsibilities
//! - **Languages**: the closed set of supported codes and the `en → us` alias.
//! - **Layouts**: data-driven naming conventions (JSON parts, legacy chunks,
//!   SQLite files) and the folders they may live in.
//! - **Locator**: tries candidate paths in priority order (part download) or
//!   enumerates a dataset's parts (listing).

pub mod language;
pub mod layout;
pub mod locator;
