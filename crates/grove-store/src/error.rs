use grove_types::Hash;

/// Errors from chunk store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A chunk's recorded hash does not match its data.
    #[error("hash mismatch for {recorded}: data hashes to {computed}")]
    HashMismatch { recorded: Hash, computed: Hash },

    /// Attempted to store the empty chunk.
    #[error("cannot store the empty chunk")]
    EmptyChunk,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
