use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// An immutable byte buffer paired with its content hash.
///
/// A chunk is the unit of storage. The store never interprets a chunk's
/// bytes; decoding into typed values happens a layer up. A chunk is
/// *empty* iff its buffer is zero-length; the empty chunk carries the
/// sentinel [`Hash::empty`] and means "no value".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    hash: Hash,
    data: Vec<u8>,
}

impl Chunk {
    /// Create a chunk from raw bytes, computing its content hash.
    ///
    /// A zero-length buffer produces the empty chunk with the sentinel hash.
    pub fn new(data: Vec<u8>) -> Self {
        let hash = if data.is_empty() {
            Hash::empty()
        } else {
            Hash::of(&data)
        };
        Self { hash, data }
    }

    /// The empty chunk: zero-length buffer, sentinel hash.
    pub fn empty() -> Self {
        Self {
            hash: Hash::empty(),
            data: Vec::new(),
        }
    }

    /// The chunk's content hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the buffer in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns `true` if this is the empty chunk.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Recompute the hash from the data and compare against the recorded one.
    pub fn verify(&self) -> bool {
        if self.data.is_empty() {
            self.hash.is_empty()
        } else {
            Hash::of(&self.data) == self.hash
        }
    }

    /// Consume the chunk, returning its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
