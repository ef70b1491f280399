//! The commit struct: a payload value plus a set of parent refs.

use grove_types::Hash;
use grove_values::{RefValue, SetValue, StructValue, Value};

use crate::datasets::{datas_types, FIELD_PARENTS, FIELD_VALUE};
use crate::error::{DatasError, DatasResult};

/// A typed view over a commit struct value.
///
/// `Commit { value: Value, parents: Set<Ref<Commit>> }`. The wrapper
/// guarantees shape: any `Commit` in hand was either built by
/// [`Commit::new`] or validated by [`Commit::from_value`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    inner: StructValue,
}

impl Commit {
    /// Construct a commit from a payload and parent commit hashes.
    ///
    /// Each parent hash is lifted to a `Ref<Commit>` and the refs are
    /// wrapped in a `Set<Ref<Commit>>`.
    pub fn new(value: Value, parents: &[Hash]) -> DatasResult<Self> {
        let types = datas_types();
        let refs: Vec<Value> = parents
            .iter()
            .map(|hash| Value::Ref(Self::ref_to(*hash)))
            .collect();
        let parents = SetValue::new(types.commit_ref.clone(), refs)?;
        let inner = StructValue::new(
            commit_struct_type().clone(),
            vec![
                (FIELD_VALUE.to_string(), value),
                (FIELD_PARENTS.to_string(), Value::Set(parents)),
            ],
        )?;
        Ok(Self { inner })
    }

    /// Validate an arbitrary value as a commit struct.
    pub fn from_value(value: Value) -> DatasResult<Self> {
        let Value::Struct(inner) = value else {
            return Err(DatasError::MalformedCommit(format!(
                "expected a commit struct, got {}",
                value.kind()
            )));
        };
        if inner.struct_type() != commit_struct_type() {
            return Err(DatasError::MalformedCommit(format!(
                "expected struct {}, got struct {}",
                commit_struct_type().name(),
                inner.struct_type().name()
            )));
        }
        // StructValue construction enforced the field types; the checks
        // below only rule out a hand-rolled struct with the right name but
        // the wrong shape slipping through deserialization.
        match inner.get(FIELD_PARENTS) {
            Some(Value::Set(_)) => {}
            _ => {
                return Err(DatasError::MalformedCommit(
                    "parents field is not a set".to_string(),
                ))
            }
        }
        if inner.get(FIELD_VALUE).is_none() {
            return Err(DatasError::MalformedCommit(
                "missing value field".to_string(),
            ));
        }
        Ok(Self { inner })
    }

    /// A `Ref<Commit>` pointing at the commit stored under `hash`.
    ///
    /// The ref records its *target's* type, which for `Ref<Commit>` is the
    /// commit struct by name.
    pub fn ref_to(hash: Hash) -> RefValue {
        let target_type = match &datas_types().commit_ref {
            grove_values::Type::Ref(inner) => (**inner).clone(),
            _ => unreachable!("registered commit_ref is a ref type"),
        };
        RefValue::new(hash, target_type)
    }

    /// The commit's payload value.
    pub fn value(&self) -> &Value {
        self.inner
            .get(FIELD_VALUE)
            .expect("validated commit has a value field")
    }

    /// The commit's parent refs.
    pub fn parents(&self) -> &SetValue {
        match self.inner.get(FIELD_PARENTS) {
            Some(Value::Set(parents)) => parents,
            _ => unreachable!("validated commit has a parents set"),
        }
    }

    /// The parent hashes in canonical order.
    pub fn parent_hashes(&self) -> Vec<Hash> {
        self.parents()
            .iter()
            .filter_map(|value| match value {
                Value::Ref(r) => Some(r.target()),
                _ => None,
            })
            .collect()
    }

    /// Consume the view, returning the underlying struct value.
    pub fn into_value(self) -> Value {
        Value::Struct(self.inner)
    }

    /// The underlying struct value.
    pub fn as_value(&self) -> Value {
        Value::Struct(self.inner.clone())
    }
}

fn commit_struct_type() -> &'static grove_values::StructType {
    match &datas_types().commit {
        grove_values::Type::Struct(st) => st,
        _ => unreachable!("registered commit type is a struct"),
    }
}
