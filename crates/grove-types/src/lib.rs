//! Foundation types for the Grove datastore.
//!
//! This crate provides the two types every other Grove crate builds on:
//!
//! - [`Hash`] -- content-addressed identifier (BLAKE3 hash)
//! - [`Chunk`] -- immutable byte buffer paired with its hash
//!
//! Content addressing is the load-bearing invariant of the whole system:
//! identical bytes always produce the same [`Hash`], so chunks are
//! deduplicatable, verifiable, and immutable once written.

pub mod chunk;
pub mod error;
pub mod hash;

pub use chunk::Chunk;
pub use error::TypeError;
pub use hash::Hash;
