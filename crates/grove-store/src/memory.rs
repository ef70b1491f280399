use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use grove_types::{Chunk, Hash};

use crate::error::{StoreError, StoreResult};
use crate::traits::ChunkStore;

/// In-memory, `HashMap`-based chunk store.
///
/// Intended for tests and embedding. Chunks are held behind a `RwLock`;
/// the root pointer has its own lock so root reads never contend with bulk
/// chunk traffic. Chunks are cloned on read.
pub struct InMemoryChunkStore {
    chunks: RwLock<HashMap<Hash, Chunk>>,
    root: RwLock<Hash>,
    root_updates: AtomicU64,
    reads: AtomicU64,
    puts: AtomicU64,
}

impl InMemoryChunkStore {
    /// Create a new empty store with an unset root.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            root: RwLock::new(Hash::empty()),
            root_updates: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            puts: AtomicU64::new(0),
        }
    }

    /// Number of chunks currently stored.
    pub fn len(&self) -> usize {
        self.chunks.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored chunks.
    pub fn total_bytes(&self) -> u64 {
        self.chunks
            .read()
            .map(|m| m.values().map(Chunk::size).sum())
            .unwrap_or(0)
    }

    /// Number of successful root compare-and-swaps since construction.
    ///
    /// Lets callers observe whether an operation advanced the root.
    pub fn root_updates(&self) -> u64 {
        self.root_updates.load(Ordering::SeqCst)
    }

    /// Number of `get` calls served since construction.
    ///
    /// Lets callers observe whether a read hit an upstream cache or came
    /// through to the store.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `put` calls received since construction, including
    /// idempotent re-puts of existing chunks.
    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkStore for InMemoryChunkStore {
    fn get(&self, hash: &Hash) -> StoreResult<Chunk> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if hash.is_empty() {
            return Ok(Chunk::empty());
        }
        let chunks = self
            .chunks
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(chunks.get(hash).cloned().unwrap_or_else(Chunk::empty))
    }

    fn put(&self, chunk: Chunk) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if chunk.is_empty() {
            return Err(StoreError::EmptyChunk);
        }
        // Write-then-link: verify the recorded hash before the chunk
        // becomes reachable.
        if !chunk.verify() {
            return Err(StoreError::HashMismatch {
                recorded: chunk.hash(),
                computed: Hash::of(chunk.data()),
            });
        }
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        // Idempotent: identical hash implies identical content.
        chunks.entry(chunk.hash()).or_insert(chunk);
        Ok(())
    }

    fn root(&self) -> StoreResult<Hash> {
        let root = self
            .root
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(*root)
    }

    fn update_root(&self, new: Hash, expected: Hash) -> StoreResult<bool> {
        let mut root = self
            .root
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        if *root != expected {
            return Ok(false);
        }
        *root = new;
        self.root_updates.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn has(&self, hash: &Hash) -> StoreResult<bool> {
        if hash.is_empty() {
            return Ok(false);
        }
        let chunks = self
            .chunks
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(chunks.contains_key(hash))
    }
}

impl std::fmt::Debug for InMemoryChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChunkStore")
            .field("chunk_count", &self.len())
            .finish()
    }
}
