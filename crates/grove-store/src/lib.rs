//! Content-addressed chunk storage for the Grove datastore.
//!
//! This crate defines the lowest storage layer: a key-value store mapping
//! content hashes to opaque byte chunks, plus a single atomically updatable
//! **root pointer**. Everything above it (typed values, datasets, commits)
//! is expressed in terms of this contract.
//!
//! # Design Rules
//!
//! 1. Chunks are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent: the same bytes always land under the same hash.
//! 3. The store never interprets chunk contents; it is a pure key-value store.
//! 4. The root pointer only moves through compare-and-swap; the CAS is the
//!    linearization point for all writers.
//! 5. All I/O errors are propagated, never silently ignored.
//!
//! # Backends
//!
//! All backends implement the [`ChunkStore`] trait:
//!
//! - [`InMemoryChunkStore`] -- `HashMap`-based store for tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryChunkStore;
pub use traits::ChunkStore;
