//! Functional container values: sets and maps.
//!
//! Both containers are persistent in the functional sense: `insert`/`set`
//! return a new container and leave the receiver untouched. Elements live
//! in canonical [`Value`] order, so two containers with the same contents
//! are equal and encode to the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValueResult;
use crate::types::Type;
use crate::value::Value;

/// A typed set of values in canonical order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetValue {
    element_type: Type,
    elements: Vec<Value>,
}

impl SetValue {
    /// Create an empty set of the given element type.
    pub fn empty(element_type: Type) -> Self {
        Self {
            element_type,
            elements: Vec::new(),
        }
    }

    /// Create a set from elements, validating each against the element type.
    ///
    /// Elements are sorted into canonical order and deduplicated.
    pub fn new(element_type: Type, elements: Vec<Value>) -> ValueResult<Self> {
        for element in &elements {
            element_type.check_or_err(element)?;
        }
        let mut elements = elements;
        elements.sort();
        elements.dedup();
        Ok(Self {
            element_type,
            elements,
        })
    }

    /// The declared element type.
    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    /// Membership test by canonical equality.
    pub fn has(&self, element: &Value) -> bool {
        self.elements.binary_search(element).is_ok()
    }

    /// Functional insert: returns a new set containing `element`.
    pub fn insert(&self, element: Value) -> ValueResult<Self> {
        self.element_type.check_or_err(&element)?;
        let mut elements = self.elements.clone();
        if let Err(pos) = elements.binary_search(&element) {
            elements.insert(pos, element);
        }
        Ok(Self {
            element_type: self.element_type.clone(),
            elements,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate elements in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.elements.iter()
    }
}

/// A typed map with entries in canonical key order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapValue {
    key_type: Type,
    value_type: Type,
    #[serde(with = "entries_serde")]
    entries: BTreeMap<Value, Value>,
}

impl MapValue {
    /// Create an empty map with the given key and value types.
    pub fn empty(key_type: Type, value_type: Type) -> Self {
        Self {
            key_type,
            value_type,
            entries: BTreeMap::new(),
        }
    }

    /// The declared key type.
    pub fn key_type(&self) -> &Type {
        &self.key_type
    }

    /// The declared value type.
    pub fn value_type(&self) -> &Type {
        &self.value_type
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Functional update: returns a new map with `key` bound to `value`.
    pub fn set(&self, key: Value, value: Value) -> ValueResult<Self> {
        self.key_type.check_or_err(&key)?;
        self.value_type.check_or_err(&value)?;
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        Ok(Self {
            key_type: self.key_type.clone(),
            value_type: self.value_type.clone(),
            entries,
        })
    }

    /// Functional removal: returns a new map without `key`.
    pub fn remove(&self, key: &Value) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(key);
        Self {
            key_type: self.key_type.clone(),
            value_type: self.value_type.clone(),
            entries,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

/// Map entries serialize as an ordered sequence of `[key, value]` pairs.
/// `BTreeMap` iteration order makes the sequence canonical; a plain map
/// encoding would force string keys, which map keys here are not.
mod entries_serde {
    use std::collections::BTreeMap;

    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    use crate::value::Value;

    pub fn serialize<S: Serializer>(
        entries: &BTreeMap<Value, Value>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&Value, &Value)> = entries.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Value, Value>, D::Error> {
        let pairs = Vec::<(Value, Value)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
