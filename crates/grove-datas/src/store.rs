//! The [`DataStore`]: named datasets over a DAG of commits.
//!
//! A DataStore binds a chunk store to a snapshot of its root pointer. All
//! reads observe that snapshot; the dataset map is materialized once per
//! instance and shared by every subsequent `datasets()`/`head()` call.
//! [`DataStore::commit`] advances one dataset's head through a
//! read/validate/write/CAS cycle and hands back a fresh instance bound to
//! the advanced root.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};

use grove_store::ChunkStore;
use grove_types::Hash;
use grove_values::{decode, encode, MapValue, RefValue, Type, Value};
use tracing::debug;

use crate::ancestry;
use crate::cache::ValueCache;
use crate::commit::Commit;
use crate::datasets::{datas_types, empty_dataset_map};
use crate::error::{DatasError, DatasResult};
use crate::names::validate_dataset_id;

/// The version-control layer over a chunk store.
///
/// Construction snapshots the store's root; the instance is an immutable
/// view of that moment plus a private read-through value cache. Instances
/// are `Send + Sync`: concurrent reads and ancestry walks on one instance
/// are safe, and racing decodes of the same hash share one in-flight
/// decode.
pub struct DataStore {
    store: Arc<dyn ChunkStore>,
    cache_size: u64,
    cache: ValueCache,
    /// In-flight decodes keyed by hash, so concurrent readers of the same
    /// missing entry share one fetch+decode.
    pending: Mutex<HashMap<Hash, Arc<DecodeSlot>>>,
    /// The root snapshot this instance observes.
    root: Hash,
    /// Memoized dataset map, materialized from `root` on first use.
    dataset_map: OnceLock<MapValue>,
}

impl DataStore {
    /// Bind a DataStore to a chunk store, snapshotting the current root.
    ///
    /// `cache_size` is the value cache budget in bytes of raw chunk data;
    /// `0` disables caching.
    pub fn new(store: Arc<dyn ChunkStore>, cache_size: u64) -> DatasResult<Self> {
        let root = store.root()?;
        Ok(Self::at_root(store, cache_size, root))
    }

    /// Bind an instance to an explicit root snapshot.
    fn at_root(store: Arc<dyn ChunkStore>, cache_size: u64, root: Hash) -> Self {
        Self {
            store,
            cache_size,
            cache: ValueCache::new(cache_size),
            pending: Mutex::new(HashMap::new()),
            root,
            dataset_map: OnceLock::new(),
        }
    }

    /// The root snapshot this instance observes.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// The underlying chunk store.
    pub fn chunk_store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// The dataset map captured at construction: dataset name to
    /// `Ref<Commit>`.
    pub fn datasets(&self) -> DatasResult<&MapValue> {
        if let Some(map) = self.dataset_map.get() {
            return Ok(map);
        }
        // Racing first calls may both materialize; the cell keeps one.
        let map = self.materialize_dataset_map()?;
        Ok(self.dataset_map.get_or_init(|| map))
    }

    /// Resolve the named dataset's current head commit, if any.
    pub fn head(&self, dataset_id: &str) -> DatasResult<Option<Commit>> {
        validate_dataset_id(dataset_id)?;
        let key = Value::from(dataset_id);
        let Some(head) = self.datasets()?.get(&key).cloned() else {
            return Ok(None);
        };
        let head_ref = Self::as_head_ref(dataset_id, &head)?;
        let value = self
            .read_value(&head_ref.target())?
            .ok_or(DatasError::MissingChunk(head_ref.target()))?;
        Ok(Some(Commit::from_value(value)?))
    }

    /// Cached read of the value stored under `hash`.
    ///
    /// Returns `None` for the empty sentinel and for hashes with no chunk;
    /// both outcomes are cached so known-missing hashes don't re-issue
    /// store lookups.
    pub fn read_value(&self, hash: &Hash) -> DatasResult<Option<Value>> {
        if hash.is_empty() {
            return Ok(None);
        }
        loop {
            if let Some(entry) = self.cache.entry(hash) {
                return Ok(entry.value);
            }

            let (slot, leader) = self.claim_decode(*hash);
            if leader {
                let outcome = self.fetch_and_decode(hash);
                match &outcome {
                    Ok((value, size)) => {
                        self.cache.add(*hash, *size, value.clone());
                        slot.fulfill(value.clone());
                    }
                    Err(_) => slot.fail(),
                }
                self.release_decode(hash);
                return outcome.map(|(value, _)| value);
            }

            match slot.wait() {
                SlotState::Ready(value) => return Ok(value),
                // The leader's read failed. Loop and perform our own so
                // the backend error reaches this caller verbatim.
                SlotState::Failed | SlotState::Pending => continue,
            }
        }
    }

    /// Write a value, returning the hash of its chunk.
    ///
    /// The type is inferred for strings, bools, and structs (a struct
    /// carries its own descriptor); every other kind requires `ty`.
    /// If the cache already believes the value present, the chunk-store
    /// `put` is skipped.
    pub fn write_value(&self, value: &Value, ty: Option<&Type>) -> DatasResult<Hash> {
        let inferred;
        let ty = match ty {
            Some(ty) => ty,
            None => {
                inferred = Self::infer_type(value)?;
                &inferred
            }
        };

        let chunk = encode(value, ty)?;
        if chunk.is_empty() {
            return Err(DatasError::EmptyWrite);
        }
        let hash = chunk.hash();
        let size = chunk.size();

        if let Some(entry) = self.cache.entry(&hash) {
            if entry.is_present() {
                return Ok(hash);
            }
        }
        self.store.put(chunk)?;
        self.cache.add(hash, size, Some(value.clone()));
        Ok(hash)
    }

    // -------------------------------------------------------------------
    // Commit protocol
    // -------------------------------------------------------------------

    /// Atomically advance `dataset_id`'s head to `commit`.
    ///
    /// Fails with [`DatasError::MergeNeeded`] if `commit` does not descend
    /// from the current head, and with
    /// [`DatasError::OptimisticLockFailed`] if another writer advanced the
    /// root since this instance's snapshot. Neither failure changes the
    /// store's root; chunks written before the failure are inert.
    ///
    /// On success returns a fresh DataStore bound to the advanced root.
    /// There is no internal retry; callers retry on a new instance.
    pub fn commit(&self, dataset_id: &str, commit: Commit) -> DatasResult<DataStore> {
        validate_dataset_id(dataset_id)?;
        let types = datas_types();

        let root_old = self.root;
        let map_old = self.datasets()?.clone();

        let commit_hash = self.write_value(&commit.as_value(), Some(&types.commit))?;
        let commit_ref = Commit::ref_to(commit_hash);
        debug!(
            dataset = dataset_id,
            commit = %commit_hash.short_hex(),
            "wrote candidate commit"
        );

        // An empty root implies an empty dataset map: nothing to fast-forward
        // from.
        if !root_old.is_empty() {
            let key = Value::from(dataset_id);
            if let Some(head) = map_old.get(&key) {
                let head_ref = Self::as_head_ref(dataset_id, head)?;
                if *head_ref == commit_ref {
                    debug!(dataset = dataset_id, "commit already installed");
                    return Ok(Self::at_root(
                        Arc::clone(&self.store),
                        self.cache_size,
                        root_old,
                    ));
                }
                if !ancestry::descends_from(self, &commit, head_ref)? {
                    return Err(DatasError::MergeNeeded);
                }
            }
        }

        let map_new = map_old.set(Value::from(dataset_id), Value::Ref(commit_ref))?;
        let root_new = self.write_value(&Value::Map(map_new), Some(&types.dataset_map))?;

        if self.store.update_root(root_new, root_old)? {
            debug!(
                dataset = dataset_id,
                root = %root_new.short_hex(),
                "advanced root"
            );
            DataStore::new(Arc::clone(&self.store), self.cache_size)
        } else {
            debug!(dataset = dataset_id, "root CAS lost");
            Err(DatasError::OptimisticLockFailed)
        }
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn materialize_dataset_map(&self) -> DatasResult<MapValue> {
        if self.root.is_empty() {
            return Ok(empty_dataset_map().clone());
        }
        let value = self
            .read_value(&self.root)?
            .ok_or(DatasError::MissingChunk(self.root))?;
        match value {
            Value::Map(map) => {
                let types = datas_types();
                if map.key_type() != &Type::String || map.value_type() != &types.commit_ref {
                    return Err(DatasError::MalformedDatasetMap(format!(
                        "unexpected map type map<{}, {}>",
                        map.key_type(),
                        map.value_type()
                    )));
                }
                Ok(map)
            }
            other => Err(DatasError::MalformedDatasetMap(format!(
                "root decodes to {}",
                other.kind()
            ))),
        }
    }

    fn as_head_ref<'a>(dataset_id: &str, head: &'a Value) -> DatasResult<&'a RefValue> {
        match head {
            Value::Ref(head_ref) => Ok(head_ref),
            other => Err(DatasError::MalformedDatasetMap(format!(
                "head of {dataset_id:?} is a {}, not a ref",
                other.kind()
            ))),
        }
    }

    fn infer_type(value: &Value) -> DatasResult<Type> {
        match value {
            Value::String(_) => Ok(Type::String),
            Value::Bool(_) => Ok(Type::Bool),
            Value::Struct(sv) => Ok(Type::Struct(sv.struct_type().clone())),
            other => Err(DatasError::TypeRequired {
                kind: other.kind(),
            }),
        }
    }

    fn fetch_and_decode(&self, hash: &Hash) -> DatasResult<(Option<Value>, u64)> {
        let chunk = self.store.get(hash)?;
        if chunk.is_empty() {
            // Negative entry: costs no byte budget, suppresses re-lookups.
            return Ok((None, 0));
        }
        let size = chunk.size();
        let value = decode(&chunk)?;
        Ok((Some(value), size))
    }

    /// Join or claim the in-flight decode for `hash`. Returns the slot and
    /// whether this caller is the leader that must perform the decode.
    fn claim_decode(&self, hash: Hash) -> (Arc<DecodeSlot>, bool) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.get(&hash) {
            Some(slot) => (Arc::clone(slot), false),
            None => {
                let slot = Arc::new(DecodeSlot::new());
                pending.insert(hash, Arc::clone(&slot));
                (slot, true)
            }
        }
    }

    fn release_decode(&self, hash: &Hash) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.remove(hash);
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("root", &self.root.short_hex())
            .field("cache_size", &self.cache_size)
            .finish()
    }
}

/// Shared handle to one in-flight decode.
#[derive(Debug)]
struct DecodeSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

#[derive(Clone, Debug)]
enum SlotState {
    Pending,
    Ready(Option<Value>),
    Failed,
}

impl DecodeSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
        }
    }

    fn fulfill(&self, value: Option<Value>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = SlotState::Ready(value);
        self.ready.notify_all();
    }

    fn fail(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = SlotState::Failed;
        self.ready.notify_all();
    }

    fn wait(&self) -> SlotState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while matches!(*state, SlotState::Pending) {
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use grove_store::InMemoryChunkStore;

    use super::*;

    fn fresh(cache_size: u64) -> (Arc<InMemoryChunkStore>, DataStore) {
        let chunks = Arc::new(InMemoryChunkStore::new());
        let ds = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, cache_size).unwrap();
        (chunks, ds)
    }

    fn commit_of(payload: &str, parents: &[Hash]) -> Commit {
        Commit::new(Value::from(payload), parents).unwrap()
    }

    /// The hash the named dataset's head ref points at.
    fn head_hash(ds: &DataStore, dataset_id: &str) -> Hash {
        match ds.datasets().unwrap().get(&Value::from(dataset_id)) {
            Some(Value::Ref(r)) => r.target(),
            other => panic!("expected a head ref for {dataset_id}, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // First commit / empty store (S1)
    // -----------------------------------------------------------------------

    #[test]
    fn first_commit_on_empty_store() {
        let (chunks, ds) = fresh(0);
        assert!(chunks.root().unwrap().is_empty());

        let ds = ds.commit("main", commit_of("hello", &[])).unwrap();

        let head = ds.head("main").unwrap().expect("head after first commit");
        assert_eq!(head.value(), &Value::from("hello"));
        assert!(head.parents().is_empty());
        assert!(!chunks.root().unwrap().is_empty());
    }

    #[test]
    fn empty_store_has_no_datasets() {
        let (_, ds) = fresh(0);
        assert!(ds.datasets().unwrap().is_empty());
        assert!(ds.head("main").unwrap().is_none());
    }

    // -----------------------------------------------------------------------
    // Fast-forward (S2) and rejection (S3)
    // -----------------------------------------------------------------------

    #[test]
    fn fast_forward_advances_head() {
        let (_, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("hello", &[])).unwrap();
        let c1 = head_hash(&ds, "main");

        let ds = ds.commit("main", commit_of("world", &[c1])).unwrap();

        let head = ds.head("main").unwrap().unwrap();
        assert_eq!(head.value(), &Value::from("world"));
        assert_eq!(head.parent_hashes(), vec![c1]);
        assert!(head.parents().has(&Value::Ref(Commit::ref_to(c1))));
    }

    #[test]
    fn non_fast_forward_is_rejected() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("hello", &[])).unwrap();
        let root_before = chunks.root().unwrap();

        let err = ds.commit("main", commit_of("fork", &[])).unwrap_err();
        assert!(matches!(err, DatasError::MergeNeeded));
        assert_eq!(err.to_string(), "Merge needed");
        // Atomicity: a failed commit leaves the root untouched.
        assert_eq!(chunks.root().unwrap(), root_before);
    }

    #[test]
    fn multi_step_fast_forward() {
        let (_, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("one", &[])).unwrap();
        let c1 = head_hash(&ds, "main");
        let ds = ds.commit("main", commit_of("two", &[c1])).unwrap();
        let c2 = head_hash(&ds, "main");

        // A commit parenting c1 (not the current head c2) is stale.
        let err = ds.commit("main", commit_of("stale", &[c1])).unwrap_err();
        assert!(matches!(err, DatasError::MergeNeeded));

        // Parenting the current head works.
        let ds = ds.commit("main", commit_of("three", &[c2])).unwrap();
        assert_eq!(
            ds.head("main").unwrap().unwrap().value(),
            &Value::from("three")
        );
    }

    // -----------------------------------------------------------------------
    // Optimistic locking (S4)
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_commit_loses_optimistic_lock() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("base", &[])).unwrap();
        let base = head_hash(&ds, "main");

        // Two stores observe the same root.
        let a = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        let b = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();

        a.commit("main", commit_of("from-a", &[base])).unwrap();

        let err = b.commit("main", commit_of("from-b", &[base])).unwrap_err();
        assert!(matches!(err, DatasError::OptimisticLockFailed));
        assert_eq!(err.to_string(), "Optimistic lock failed");
    }

    #[test]
    fn loser_succeeds_after_resnapshot() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("base", &[])).unwrap();
        let base = head_hash(&ds, "main");

        let b = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        ds.commit("main", commit_of("winner", &[base])).unwrap();
        assert!(matches!(
            b.commit("main", commit_of("loser", &[base])),
            Err(DatasError::OptimisticLockFailed)
        ));

        // Retry on a fresh snapshot, parenting the new head.
        let b = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        let winner = head_hash(&b, "main");
        let b = b.commit("main", commit_of("loser", &[winner])).unwrap();
        assert_eq!(
            b.head("main").unwrap().unwrap().value(),
            &Value::from("loser")
        );
    }

    #[test]
    fn threaded_commits_admit_one_winner() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("base", &[])).unwrap();
        let base = head_hash(&ds, "main");
        drop(ds);

        let handles: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|name| {
                let chunks = Arc::clone(&chunks);
                thread::spawn(move || {
                    let ds =
                        DataStore::new(chunks as Arc<dyn ChunkStore>, 0).unwrap();
                    ds.commit("main", commit_of(name, &[base])).map(|_| ())
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(DatasError::OptimisticLockFailed)))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(losses, 1);
    }

    // -----------------------------------------------------------------------
    // Idempotent recommit (S5)
    // -----------------------------------------------------------------------

    #[test]
    fn recommitting_the_head_is_idempotent() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("hello", &[])).unwrap();
        let c1 = head_hash(&ds, "main");
        let ds = ds.commit("main", commit_of("world", &[c1])).unwrap();
        let c2 = head_hash(&ds, "main");

        let updates_before = chunks.root_updates();
        let ds = ds.commit("main", commit_of("world", &[c1])).unwrap();

        // Same head, and no root CAS was issued.
        assert_eq!(head_hash(&ds, "main"), c2);
        assert_eq!(chunks.root_updates(), updates_before);
        assert_eq!(
            ds.head("main").unwrap().unwrap().value(),
            &Value::from("world")
        );
    }

    // -----------------------------------------------------------------------
    // Independent datasets (S6)
    // -----------------------------------------------------------------------

    #[test]
    fn datasets_are_independent() {
        let (_, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("hello", &[])).unwrap();
        let ds = ds
            .commit("release", Commit::new(Value::Int(42), &[]).unwrap())
            .unwrap();

        assert_eq!(
            ds.head("main").unwrap().unwrap().value(),
            &Value::from("hello")
        );
        assert_eq!(ds.head("release").unwrap().unwrap().value(), &Value::Int(42));
        assert_eq!(ds.datasets().unwrap().len(), 2);
    }

    #[test]
    fn commit_rejects_invalid_dataset_id() {
        let (_, ds) = fresh(0);
        let err = ds.commit("bad name", commit_of("x", &[])).unwrap_err();
        assert!(matches!(err, DatasError::InvalidDatasetId { .. }));
        assert!(ds.head("bad name").is_err());
    }

    // -----------------------------------------------------------------------
    // Snapshot isolation
    // -----------------------------------------------------------------------

    #[test]
    fn readers_observe_their_snapshot() {
        let (chunks, ds) = fresh(0);
        let ds = ds.commit("main", commit_of("v1", &[])).unwrap();
        let c1 = head_hash(&ds, "main");

        let frozen = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        ds.commit("main", commit_of("v2", &[c1])).unwrap();

        // `frozen` still sees v1; a new snapshot sees v2.
        assert_eq!(
            frozen.head("main").unwrap().unwrap().value(),
            &Value::from("v1")
        );
        let current = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        assert_eq!(
            current.head("main").unwrap().unwrap().value(),
            &Value::from("v2")
        );
    }

    // -----------------------------------------------------------------------
    // read_value / write_value
    // -----------------------------------------------------------------------

    #[test]
    fn read_value_of_empty_sentinel_is_none() {
        let (chunks, ds) = fresh(1024);
        let reads_before = chunks.reads();
        assert!(ds.read_value(&Hash::empty()).unwrap().is_none());
        // The sentinel never reaches the store.
        assert_eq!(chunks.reads(), reads_before);
    }

    #[test]
    fn read_value_roundtrip() {
        let (_, ds) = fresh(1024);
        let value = Value::from("roundtrip");
        let hash = ds.write_value(&value, None).unwrap();
        assert_eq!(ds.read_value(&hash).unwrap(), Some(value));
    }

    #[test]
    fn read_value_matches_direct_decode() {
        // Cache coherence: the cached read equals decoding the raw chunk,
        // hit or miss.
        let (chunks, ds) = fresh(1024);
        let value = Value::from("coherent");
        let hash = ds.write_value(&value, None).unwrap();

        let direct = decode(&chunks.get(&hash).unwrap()).unwrap();
        assert_eq!(ds.read_value(&hash).unwrap(), Some(direct.clone()));
        // Second read is a cache hit; still coherent.
        assert_eq!(ds.read_value(&hash).unwrap(), Some(direct));
    }

    #[test]
    fn missing_hash_is_cached_as_absent() {
        let (chunks, ds) = fresh(1024);
        let unknown = Hash::of(b"nobody wrote this");

        let reads_before = chunks.reads();
        assert!(ds.read_value(&unknown).unwrap().is_none());
        assert!(ds.read_value(&unknown).unwrap().is_none());
        // One store lookup; the negative entry absorbs the second read.
        assert_eq!(chunks.reads() - reads_before, 1);
        assert_eq!(ds.cache.total_bytes(), 0);
    }

    #[test]
    fn write_value_infers_string_bool_struct() {
        let (_, ds) = fresh(0);
        ds.write_value(&Value::from("s"), None).unwrap();
        ds.write_value(&Value::Bool(true), None).unwrap();
        ds.write_value(&commit_of("c", &[]).as_value(), None).unwrap();
    }

    #[test]
    fn write_value_requires_type_for_other_kinds() {
        let (_, ds) = fresh(0);
        let err = ds.write_value(&Value::Int(42), None).unwrap_err();
        assert!(matches!(err, DatasError::TypeRequired { kind: "int" }));
        assert_eq!(err.to_string(), "type parameter is required for int");

        ds.write_value(&Value::Int(42), Some(&Type::Int)).unwrap();
    }

    #[test]
    fn write_value_skips_put_when_cached_present() {
        let (chunks, ds) = fresh(1024);
        let value = Value::from("write once");

        ds.write_value(&value, None).unwrap();
        let puts_after_first = chunks.puts();
        ds.write_value(&value, None).unwrap();
        assert_eq!(chunks.puts(), puts_after_first);

        // Without a cache, the idempotent put is re-issued.
        let (chunks, ds) = fresh(0);
        ds.write_value(&value, None).unwrap();
        ds.write_value(&value, None).unwrap();
        assert_eq!(chunks.puts(), 2);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn write_value_upgrades_negative_cache_entry() {
        let (chunks, ds) = fresh(1024);
        let value = Value::from("late arrival");
        let hash = encode(&value, &Type::String).unwrap().hash();

        // Read before write: negative entry.
        assert!(ds.read_value(&hash).unwrap().is_none());
        // Write must not be skipped because of it.
        assert_eq!(ds.write_value(&value, None).unwrap(), hash);
        assert!(chunks.has(&hash).unwrap());
        assert_eq!(ds.read_value(&hash).unwrap(), Some(value));
    }

    // -----------------------------------------------------------------------
    // Cache behavior through the read path (S7)
    // -----------------------------------------------------------------------

    #[test]
    fn cache_eviction_under_pressure() {
        let budget = 256u64;
        let (chunks, ds) = fresh(budget);

        // Distinct large values, together well over budget.
        let mut hashes = Vec::new();
        for i in 0..8 {
            let value = Value::from("x".repeat(100) + &i.to_string());
            hashes.push(ds.write_value(&value, None).unwrap());
        }
        for hash in &hashes {
            ds.read_value(hash).unwrap();
        }

        assert!(ds.cache.total_bytes() <= budget);

        // The most recently read value is retained: no fresh store get.
        let last = *hashes.last().unwrap();
        let reads_before = chunks.reads();
        ds.read_value(&last).unwrap();
        assert_eq!(chunks.reads(), reads_before);

        // An evicted hash goes back to the store.
        let first = hashes[0];
        ds.read_value(&first).unwrap();
        assert_eq!(chunks.reads(), reads_before + 1);
    }

    #[test]
    fn concurrent_reads_share_one_decode() {
        let (chunks, ds) = fresh(4096);
        let value = Value::from("shared decode target");
        let hash = ds.write_value(&value, None).unwrap();

        // Evict knowledge of the value so reads start cold.
        let ds = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 4096).unwrap();
        let ds = Arc::new(ds);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ds = Arc::clone(&ds);
                thread::spawn(move || ds.read_value(&hash).unwrap())
            })
            .collect();
        for handle in handles {
            let read = handle.join().expect("thread should not panic");
            assert_eq!(read, Some(value.clone()));
        }

        // Once warm, further reads never touch the store.
        let reads_before = chunks.reads();
        ds.read_value(&hash).unwrap();
        assert_eq!(chunks.reads(), reads_before);
    }

    // -----------------------------------------------------------------------
    // Empty-map canonicity
    // -----------------------------------------------------------------------

    #[test]
    fn empty_root_resolves_to_canonical_empty_map() {
        let (_, ds) = fresh(0);
        assert_eq!(ds.datasets().unwrap(), empty_dataset_map());

        // Two independent empty stores write the empty map to the same hash.
        let (_, other) = fresh(0);
        let types = datas_types();
        let h1 = ds
            .write_value(
                &Value::Map(ds.datasets().unwrap().clone()),
                Some(&types.dataset_map),
            )
            .unwrap();
        let h2 = other
            .write_value(
                &Value::Map(other.datasets().unwrap().clone()),
                Some(&types.dataset_map),
            )
            .unwrap();
        assert_eq!(h1, h2);
    }

    // -----------------------------------------------------------------------
    // Corrupt state surfaces as errors
    // -----------------------------------------------------------------------

    #[test]
    fn root_pointing_at_non_map_is_malformed() {
        let (chunks, _) = fresh(0);
        let stray = {
            let ds = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
            ds.write_value(&Value::from("not a map"), None).unwrap()
        };
        chunks.update_root(stray, Hash::empty()).unwrap();

        let ds = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        let err = ds.datasets().unwrap_err();
        assert!(matches!(err, DatasError::MalformedDatasetMap(_)));
    }

    #[test]
    fn root_pointing_at_missing_chunk_is_surfaced() {
        let (chunks, _) = fresh(0);
        chunks
            .update_root(Hash::of(b"dangling root"), Hash::empty())
            .unwrap();

        let ds = DataStore::new(chunks.clone() as Arc<dyn ChunkStore>, 0).unwrap();
        let err = ds.datasets().unwrap_err();
        assert!(matches!(err, DatasError::MissingChunk(_)));
    }
}
