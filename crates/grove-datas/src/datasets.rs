//! Process-wide type registry and the canonical empty dataset map.
//!
//! The commit struct type and its derived container types are registered
//! exactly once per process; the descriptors (and therefore their hashes)
//! are stable for the process lifetime. Both singletons are lazy and safe
//! under concurrent first calls.

use std::sync::OnceLock;

use grove_values::{MapValue, StructType, Type};

/// The registered value types of the datas layer.
///
/// `Commit { value: Value, parents: Set<Ref<Commit>> }`, plus the derived
/// `Ref<Commit>`, `Set<Ref<Commit>>`, and `Map<string, Ref<Commit>>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasTypes {
    /// The commit struct type.
    pub commit: Type,
    /// `Ref<Commit>`: how dataset heads and parents point at commits.
    pub commit_ref: Type,
    /// `Set<Ref<Commit>>`: the type of a commit's parents field.
    pub parents: Type,
    /// `Map<string, Ref<Commit>>`: the dataset map the root resolves to.
    pub dataset_map: Type,
}

/// Name of the commit struct type.
pub const COMMIT_NAME: &str = "Commit";

/// Field holding a commit's payload value.
pub const FIELD_VALUE: &str = "value";

/// Field holding a commit's parent refs.
pub const FIELD_PARENTS: &str = "parents";

/// The process-wide registered types.
pub fn datas_types() -> &'static DatasTypes {
    static TYPES: OnceLock<DatasTypes> = OnceLock::new();
    TYPES.get_or_init(|| {
        // `Named` breaks the Commit -> parents -> Commit descriptor cycle.
        let commit_ref = Type::Ref(Box::new(Type::Named(COMMIT_NAME.to_string())));
        let parents = Type::Set(Box::new(commit_ref.clone()));
        let commit = Type::Struct(StructType::new(
            COMMIT_NAME,
            vec![
                (FIELD_VALUE.to_string(), Type::Value),
                (FIELD_PARENTS.to_string(), parents.clone()),
            ],
        ));
        let dataset_map = Type::Map(Box::new(Type::String), Box::new(commit_ref.clone()));
        DatasTypes {
            commit,
            commit_ref,
            parents,
            dataset_map,
        }
    })
}

/// The canonical empty dataset map: `Map<string, Ref<Commit>>` with no
/// entries. Created once per process; every empty-root DataStore resolves
/// to a clone of this value, so the empty map always writes to the same
/// chunk hash.
pub fn empty_dataset_map() -> &'static MapValue {
    static EMPTY: OnceLock<MapValue> = OnceLock::new();
    EMPTY.get_or_init(|| {
        let types = datas_types();
        MapValue::empty(Type::String, types.commit_ref.clone())
    })
}
