//! The canonical value codec.
//!
//! Values encode to JSON chunks. The encoding is deterministic: enum
//! variants are externally tagged, struct fields serialize in declaration
//! order, and containers iterate in canonical order. Equal values therefore
//! always produce byte-identical chunks and identical content hashes.
//!
//! Refs encode as inline hashes, so decoding never touches the chunk store.

use grove_types::Chunk;

use crate::error::{ValueError, ValueResult};
use crate::types::Type;
use crate::value::Value;

/// Encode a value into a chunk, validating it against `ty` first.
pub fn encode(value: &Value, ty: &Type) -> ValueResult<Chunk> {
    ty.check_or_err(value)?;
    let bytes = serde_json::to_vec(value).map_err(|e| ValueError::Serialization(e.to_string()))?;
    Ok(Chunk::new(bytes))
}

/// Decode a chunk back into a value.
///
/// The empty chunk means "no value" and is an error here; callers decide
/// what absence means before asking for a decode.
pub fn decode(chunk: &Chunk) -> ValueResult<Value> {
    if chunk.is_empty() {
        return Err(ValueError::EmptyChunk);
    }
    serde_json::from_slice(chunk.data()).map_err(|e| ValueError::Serialization(e.to_string()))
}
