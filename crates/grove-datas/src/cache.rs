//! Read-through value cache with size-bounded LRU eviction.
//!
//! The cache maps chunk hashes to decoded values and amortizes decode costs
//! across ancestry walks and repeated reads. Two variants exist, selected
//! by the DataStore's `cache_size`: a bounded LRU (size > 0, budget in
//! bytes of raw chunk data) and a no-op that never retains.
//!
//! An entry may record "chunk was empty / no such value" (`value: None`) at
//! size 0, so known-missing hashes don't re-issue chunk-store lookups.
//!
//! The cache never reports errors; a lookup miss is a normal outcome.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use grove_types::Hash;
use grove_values::Value;
use tracing::trace;

/// One cache entry: the raw chunk size recorded at insertion and the
/// decoded value, or `None` for a known-empty chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Size in bytes of the raw chunk, as recorded at insertion.
    pub size: u64,
    /// The decoded value; `None` records "no such value".
    pub value: Option<Value>,
}

impl CacheEntry {
    /// Returns `true` if the entry holds a value (as opposed to recording
    /// a known-missing chunk).
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// The per-DataStore value cache.
#[derive(Debug)]
pub enum ValueCache {
    /// Byte-bounded LRU.
    Bounded(Mutex<BoundedCache>),
    /// Never retains anything.
    Noop,
}

impl ValueCache {
    /// Select the variant: `max_bytes > 0` is bounded, otherwise no-op.
    pub fn new(max_bytes: u64) -> Self {
        if max_bytes > 0 {
            Self::Bounded(Mutex::new(BoundedCache::new(max_bytes)))
        } else {
            Self::Noop
        }
    }

    /// Look up an entry, marking it most-recently-used on a hit.
    pub fn entry(&self, hash: &Hash) -> Option<CacheEntry> {
        match self {
            Self::Bounded(inner) => inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .lookup(hash),
            Self::Noop => None,
        }
    }

    /// The cached value for `hash` if any; same MRU side effect as
    /// [`entry`](Self::entry). The outer `Option` is the hit/miss, the
    /// inner one the present/known-empty distinction.
    pub fn get(&self, hash: &Hash) -> Option<Option<Value>> {
        self.entry(hash).map(|entry| entry.value)
    }

    /// Insert or refresh an entry at the MRU position.
    pub fn add(&self, hash: Hash, size: u64, value: Option<Value>) {
        if let Self::Bounded(inner) = self {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(hash, CacheEntry { size, value });
        }
    }

    /// Total recorded bytes currently held.
    pub fn total_bytes(&self) -> u64 {
        match self {
            Self::Bounded(inner) => inner.lock().unwrap_or_else(PoisonError::into_inner).total,
            Self::Noop => 0,
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        match self {
            Self::Bounded(inner) => {
                inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .nodes
                    .len()
            }
            Self::Noop => 0,
        }
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Linked-hash-map LRU state: O(1) lookup, O(1) unlink, O(1) MRU insert,
/// and in-order traversal from the LRU end for eviction.
#[derive(Debug)]
pub struct BoundedCache {
    max: u64,
    total: u64,
    nodes: HashMap<Hash, Node>,
    /// Least-recently-used end of the order.
    head: Option<Hash>,
    /// Most-recently-used end of the order.
    tail: Option<Hash>,
}

#[derive(Debug)]
struct Node {
    entry: CacheEntry,
    prev: Option<Hash>,
    next: Option<Hash>,
}

impl BoundedCache {
    fn new(max: u64) -> Self {
        Self {
            max,
            total: 0,
            nodes: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    fn lookup(&mut self, hash: &Hash) -> Option<CacheEntry> {
        if !self.nodes.contains_key(hash) {
            return None;
        }
        self.unlink(hash);
        self.push_mru(*hash);
        self.nodes.get(hash).map(|node| node.entry.clone())
    }

    fn insert(&mut self, hash: Hash, entry: CacheEntry) {
        // Re-insertion replaces the old entry entirely so the new one
        // lands at the MRU end with the new size.
        if let Some(old_size) = self.nodes.get(&hash).map(|node| node.entry.size) {
            self.total -= old_size;
            self.unlink(&hash);
            self.nodes.remove(&hash);
        }

        self.total += entry.size;
        self.nodes.insert(
            hash,
            Node {
                entry,
                prev: None,
                next: None,
            },
        );
        self.push_mru(hash);

        while self.total > self.max {
            let Some(lru) = self.head else { break };
            self.unlink(&lru);
            if let Some(node) = self.nodes.remove(&lru) {
                self.total -= node.entry.size;
                trace!(hash = %lru.short_hex(), size = node.entry.size, "evicted cache entry");
            }
        }
    }

    /// Detach `hash` from the order without touching the node map.
    fn unlink(&mut self, hash: &Hash) {
        let Some(node) = self.nodes.get(hash) else {
            return;
        };
        let (prev, next) = (node.prev, node.next);

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.nodes.get_mut(&p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.nodes.get_mut(&n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes.get_mut(hash) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Append an already-detached `hash` at the MRU end.
    fn push_mru(&mut self, hash: Hash) {
        let old_tail = self.tail;
        if let Some(node) = self.nodes.get_mut(&hash) {
            node.prev = old_tail;
            node.next = None;
        }
        if let Some(t) = old_tail {
            if let Some(tail_node) = self.nodes.get_mut(&t) {
                tail_node.next = Some(hash);
            }
        }
        self.tail = Some(hash);
        if self.head.is_none() {
            self.head = Some(hash);
        }
    }

    /// Hashes from the LRU end to the MRU end. Test support.
    #[cfg(test)]
    fn order(&self) -> Vec<Hash> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(hash) = cursor {
            order.push(hash);
            cursor = self.nodes.get(&hash).and_then(|node| node.next);
        }
        order
    }
}
