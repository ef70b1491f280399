//! Type descriptors for values.
//!
//! A [`Type`] describes the shape of a [`Value`](crate::Value) and travels
//! with refs (a ref records its target's type). Descriptors are compared
//! structurally. [`Type::Named`] refers to a struct type by name; it exists
//! to break self-reference cycles: a descriptor like
//! `Struct Commit { parents: Set<Ref<Commit>> }` would otherwise be
//! infinitely recursive.

use std::fmt;

use grove_types::Hash;
use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};
use crate::value::Value;

/// Structural type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    /// Boolean primitive.
    Bool,
    /// 64-bit signed integer primitive.
    Int,
    /// UTF-8 string primitive.
    String,
    /// Any value. Used for fields that hold arbitrary payloads.
    Value,
    /// A named struct with declared fields.
    Struct(StructType),
    /// A set of elements of one type.
    Set(Box<Type>),
    /// A map from keys of one type to values of another.
    Map(Box<Type>, Box<Type>),
    /// A reference to a value of the target type, held by content hash.
    Ref(Box<Type>),
    /// A struct type referred to by name. Breaks descriptor cycles.
    Named(String),
}

impl Type {
    /// Check a value against this descriptor.
    ///
    /// The check is shallow for composites: containers validate their
    /// elements at construction, so matching the recorded container type is
    /// sufficient here. `Named` matches any struct with that name; `Value`
    /// admits anything.
    pub fn check(&self, value: &Value) -> bool {
        match (self, value) {
            (Type::Value, _) => true,
            (Type::Bool, Value::Bool(_)) => true,
            (Type::Int, Value::Int(_)) => true,
            (Type::String, Value::String(_)) => true,
            (Type::Struct(st), Value::Struct(sv)) => sv.struct_type() == st,
            (Type::Named(name), Value::Struct(sv)) => sv.struct_type().name() == name,
            (Type::Set(elem), Value::Set(sv)) => sv.element_type() == elem.as_ref(),
            (Type::Map(k, v), Value::Map(mv)) => {
                mv.key_type() == k.as_ref() && mv.value_type() == v.as_ref()
            }
            (Type::Ref(target), Value::Ref(rv)) => rv.target_type() == target.as_ref(),
            _ => false,
        }
    }

    /// Check a value, returning a descriptive error on mismatch.
    pub fn check_or_err(&self, value: &Value) -> ValueResult<()> {
        if self.check(value) {
            Ok(())
        } else {
            Err(ValueError::TypeMismatch {
                expected: self.to_string(),
                actual: value.kind().to_string(),
            })
        }
    }

    /// The content hash of this descriptor's canonical encoding.
    ///
    /// Structurally equal descriptors always hash identically, so the hash
    /// is stable across the process.
    pub fn hash(&self) -> ValueResult<Hash> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| ValueError::Serialization(e.to_string()))?;
        Ok(Hash::of(&bytes))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Value => write!(f, "value"),
            Type::Struct(st) => write!(f, "struct {}", st.name()),
            Type::Set(elem) => write!(f, "set<{elem}>"),
            Type::Map(k, v) => write!(f, "map<{k}, {v}>"),
            Type::Ref(target) => write!(f, "ref<{target}>"),
            Type::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A named struct type: an ordered list of `(field, type)` declarations.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructType {
    name: String,
    fields: Vec<(String, Type)>,
}

impl StructType {
    /// Create a struct type from a name and field declarations.
    pub fn new(name: impl Into<String>, fields: Vec<(String, Type)>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The struct's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields in declaration order.
    pub fn fields(&self) -> &[(String, Type)] {
        &self.fields
    }

    /// Look up a declared field's type by name.
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}
