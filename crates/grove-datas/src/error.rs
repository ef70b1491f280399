use grove_store::StoreError;
use grove_types::Hash;
use grove_values::ValueError;

/// Errors from DataStore operations.
///
/// The DataStore originates only the concurrency-protocol conditions
/// ([`MergeNeeded`](DatasError::MergeNeeded),
/// [`OptimisticLockFailed`](DatasError::OptimisticLockFailed)) and boundary
/// precondition failures; chunk-store and codec errors pass through
/// unwrapped.
#[derive(Debug, thiserror::Error)]
pub enum DatasError {
    /// The new commit does not descend from the dataset's current head.
    /// The caller decides whether to merge, rebase, or drop the commit.
    #[error("Merge needed")]
    MergeNeeded,

    /// The root moved between snapshot and compare-and-swap. Retry on a
    /// freshly constructed DataStore.
    #[error("Optimistic lock failed")]
    OptimisticLockFailed,

    /// `write_value` was handed a value whose type cannot be inferred.
    #[error("type parameter is required for {kind}")]
    TypeRequired { kind: &'static str },

    /// A dataset id failed validation.
    #[error("invalid dataset id {name:?}: {reason}")]
    InvalidDatasetId { name: String, reason: String },

    /// A value that should be a commit struct is not one.
    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    /// The root resolved to something other than a dataset map.
    #[error("malformed dataset map: {0}")]
    MalformedDatasetMap(String),

    /// A hash that must resolve (a commit parent, the root) came back empty.
    #[error("missing chunk: {0}")]
    MissingChunk(Hash),

    /// Encoding a value produced the empty chunk.
    #[error("encoded value produced an empty chunk")]
    EmptyWrite,

    /// Chunk store failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Value system failure, propagated unchanged.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Result alias for DataStore operations.
pub type DatasResult<T> = Result<T, DatasError>;
