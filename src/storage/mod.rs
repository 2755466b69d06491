//! Chunk Store Module
//!
//! Read-only access to the object storage holding the dataset parts.
//!
//! ## Core Concepts
//! - **Backend**: `StorageBackend` hides where objects live (local directory,
//!   Supabase storage bucket, in-memory map for tests).
//! - **Client**: `ChunkStore` is what the rest of the crate talks to. It fills
//!   in missing metadata and exposes whole-object, byte-range and streaming reads.
//! - **Streaming**: raw part downloads are forwarded as opaque byte streams,
//!   never decompressed here. Dropping a stream aborts the underlying fetch.

pub mod backend;
pub mod client;
pub mod error;
pub mod local;
pub mod supabase;

#[cfg(test)]
pub(crate) mod memory;
