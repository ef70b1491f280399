//! The Grove DataStore: the version-control layer over chunk storage.
//!
//! A [`DataStore`] manages named **datasets**, each a moving pointer into a
//! DAG of [`Commit`]s. New commits must descend from the dataset's current
//! head (fast-forward only; the store refuses to merge), and concurrent
//! writers coordinate through optimistic concurrency on the chunk store's
//! single root pointer.
//!
//! A DataStore instance is a snapshot: it captures the root at construction
//! and all reads observe that snapshot. A successful [`DataStore::commit`]
//! returns a *fresh* instance bound to the advanced root; a failed one
//! leaves the store untouched. Retry is the caller's job:
//!
//! ```text
//! loop {
//!     match ds.commit("main", commit.clone()) {
//!         Ok(next) => break next,
//!         Err(DatasError::OptimisticLockFailed) => {
//!             ds = DataStore::new(store.clone(), cache_size)?; // re-snapshot
//!         }
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```
//!
//! Reads go through a per-instance [`cache::ValueCache`]: a byte-bounded
//! LRU over decoded values that also remembers known-missing hashes and
//! shares in-flight decodes between concurrent readers.

pub mod ancestry;
pub mod cache;
pub mod commit;
pub mod datasets;
pub mod error;
pub mod names;
pub mod store;

pub use commit::Commit;
pub use datasets::{datas_types, empty_dataset_map, DatasTypes};
pub use error::{DatasError, DatasResult};
pub use names::validate_dataset_id;
pub use store::DataStore;
