//! Commit ancestry walking: the fast-forward test.
//!
//! Decides whether a dataset's current head lies in the transitive closure
//! of a candidate commit's parents. The walk is a breadth-first traversal
//! over *generations*: the frontier starts as the candidate's parents and
//! is replaced wholesale by the union of the next level's parents. Set
//! semantics (content-addressed equality) coalesce shared ancestors, so
//! the frontier is bounded by the DAG's width.
//!
//! Termination is guaranteed by content addressing: a commit's hash depends
//! on its parents' hashes, so the history is finite and acyclic.

use std::collections::BTreeSet;

use grove_types::Hash;
use grove_values::RefValue;

use crate::commit::Commit;
use crate::error::{DatasError, DatasResult};
use crate::store::DataStore;

/// Returns `true` iff `head` is in the transitive closure of `commit`'s
/// parents.
///
/// The membership test runs once per generation, before expansion, so the
/// walk short-circuits as soon as the head enters the frontier. Read and
/// decode errors surface verbatim; callers treat them as commit failure.
pub fn descends_from(store: &DataStore, commit: &Commit, head: &RefValue) -> DatasResult<bool> {
    let target = head.target();
    let mut frontier: BTreeSet<Hash> = commit.parent_hashes().into_iter().collect();

    while !frontier.is_empty() {
        if frontier.contains(&target) {
            return Ok(true);
        }
        frontier = next_generation(store, &frontier)?;
    }
    Ok(false)
}

/// The union of the parents of every commit in `frontier`, resolved through
/// the DataStore read path (and therefore the value cache).
fn next_generation(store: &DataStore, frontier: &BTreeSet<Hash>) -> DatasResult<BTreeSet<Hash>> {
    let mut next = BTreeSet::new();
    for hash in frontier {
        let value = store
            .read_value(hash)?
            .ok_or(DatasError::MissingChunk(*hash))?;
        let commit = Commit::from_value(value)?;
        next.extend(commit.parent_hashes());
    }
    Ok(next)
}
