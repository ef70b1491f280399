use grove_types::{Chunk, Hash};

use crate::error::StoreResult;

/// Content-addressed chunk store with an atomic root pointer.
///
/// All implementations must satisfy these invariants:
/// - Chunks are immutable once written. Content-addressing guarantees this:
///   the same bytes always produce the same hash.
/// - `get` of an absent hash returns the empty chunk, not an error.
/// - `put` is idempotent and keyed by the chunk's own hash.
/// - `update_root` is an atomic compare-and-swap; concurrent callers see a
///   total order on successful root advancements.
/// - Implementations provide their own internal synchronization; all
///   operations are safe to call from concurrent readers and writers.
pub trait ChunkStore: Send + Sync {
    /// Read the chunk with hash `hash`.
    ///
    /// Returns the empty chunk if no such chunk exists.
    /// Returns `Err` on I/O failure.
    fn get(&self, hash: &Hash) -> StoreResult<Chunk>;

    /// Write a chunk, keyed by its own hash.
    ///
    /// If the chunk already exists this is a no-op (idempotent). Writing the
    /// empty chunk is an error: the empty hash is the "no value" sentinel
    /// and must never resolve to stored bytes.
    fn put(&self, chunk: Chunk) -> StoreResult<()>;

    /// The current root pointer.
    ///
    /// Returns [`Hash::empty`] if the root has never been set.
    fn root(&self) -> StoreResult<Hash>;

    /// Atomically advance the root pointer.
    ///
    /// Returns `true` iff the stored root equalled `expected` at the moment
    /// of the swap and is now `new`. On `false` the root is unchanged and
    /// the caller must re-read it before retrying.
    fn update_root(&self, new: Hash, expected: Hash) -> StoreResult<bool>;

    /// Check whether a chunk exists without copying its data.
    ///
    /// Default implementation reads the chunk. Backends may override.
    fn has(&self, hash: &Hash) -> StoreResult<bool> {
        Ok(!self.get(hash)?.is_empty())
    }
}
