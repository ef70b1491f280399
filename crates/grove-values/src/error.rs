use thiserror::Error;

/// Errors from value construction, validation, and the codec.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// A value did not match the type it was checked against.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A struct value is missing a field its type declares.
    #[error("struct {name} is missing field {field:?}")]
    MissingField { name: String, field: String },

    /// A struct value carries a field its type does not declare.
    #[error("struct {name} has undeclared field {field:?}")]
    UndeclaredField { name: String, field: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Attempted to decode the empty chunk.
    #[error("cannot decode the empty chunk")]
    EmptyChunk,
}

/// Result alias for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
