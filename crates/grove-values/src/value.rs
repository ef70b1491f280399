//! The [`Value`] enum and the non-container value forms.
//!
//! Values carry a total canonical order so that sets and maps behave
//! deterministically: primitives order naturally, refs order by target
//! hash, and composites order structurally. Equal values always encode to
//! equal bytes, which is what makes content addressing stable.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use grove_types::Hash;
use serde::{Deserialize, Serialize};

use crate::containers::{MapValue, SetValue};
use crate::error::{ValueError, ValueResult};
use crate::types::{StructType, Type};

/// A typed, immutable value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    Struct(StructValue),
    Set(SetValue),
    Map(MapValue),
    Ref(RefValue),
}

impl Value {
    /// A short noun for this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Ref(_) => "ref",
        }
    }

    /// Rank used to order values of different kinds.
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) => 1,
            Value::String(_) => 2,
            Value::Struct(_) => 3,
            Value::Set(_) => 4,
            Value::Map(_) => 5,
            Value::Ref(_) => 6,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Struct(a), Value::Struct(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

// ---------------------------------------------------------------------------
// RefValue
// ---------------------------------------------------------------------------

/// A reference to another value: a `(target hash, target type)` pair.
///
/// Equality, ordering, and hashing consider the target hash **only**: two
/// refs to the same chunk are the same ref. Content addressing makes the
/// type tag redundant for identity; it exists so readers know what to
/// expect on the far side without decoding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefValue {
    target: Hash,
    target_type: Type,
}

impl RefValue {
    /// Create a ref to `target` with the given target type.
    pub fn new(target: Hash, target_type: Type) -> Self {
        Self {
            target,
            target_type,
        }
    }

    /// The content hash this ref points at.
    pub fn target(&self) -> Hash {
        self.target
    }

    /// The declared type of the referenced value.
    pub fn target_type(&self) -> &Type {
        &self.target_type
    }
}

impl PartialEq for RefValue {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for RefValue {}

impl PartialOrd for RefValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RefValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.target.cmp(&other.target)
    }
}

impl std::hash::Hash for RefValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.target, state);
    }
}

// ---------------------------------------------------------------------------
// StructValue
// ---------------------------------------------------------------------------

/// A named struct value: a type descriptor plus field values.
///
/// Construction validates the fields against the descriptor; a well-formed
/// `StructValue` always conforms to its own type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructValue {
    struct_type: StructType,
    fields: BTreeMap<String, Value>,
}

impl StructValue {
    /// Create a struct value, validating fields against the descriptor.
    ///
    /// Every declared field must be present and type-check; undeclared
    /// fields are rejected.
    pub fn new(struct_type: StructType, fields: Vec<(String, Value)>) -> ValueResult<Self> {
        let fields: BTreeMap<String, Value> = fields.into_iter().collect();

        for (name, ty) in struct_type.fields() {
            match fields.get(name) {
                Some(value) => ty.check_or_err(value)?,
                None => {
                    return Err(ValueError::MissingField {
                        name: struct_type.name().to_string(),
                        field: name.clone(),
                    })
                }
            }
        }
        for name in fields.keys() {
            if struct_type.field(name).is_none() {
                return Err(ValueError::UndeclaredField {
                    name: struct_type.name().to_string(),
                    field: name.clone(),
                });
            }
        }

        Ok(Self {
            struct_type,
            fields,
        })
    }

    /// The struct's type descriptor.
    pub fn struct_type(&self) -> &StructType {
        &self.struct_type
    }

    /// Look up a field's value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
