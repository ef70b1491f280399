//! Typed immutable values for the Grove datastore.
//!
//! Every piece of data above the chunk layer is a [`Value`]: a primitive
//! (bool, int, string), a named [`StructValue`], a [`SetValue`], a
//! [`MapValue`], or a [`RefValue`] pointing at another value by content
//! hash. Values are immutable; the containers update functionally:
//! `set`/`insert` return a new container and leave the original untouched.
//!
//! A [`Type`] descriptor accompanies every encoded value. Descriptors are
//! structural, with [`Type::Named`] breaking self-reference cycles (a
//! commit's parents are refs to commits).
//!
//! The [`codec`] module turns values into chunks and back. The encoding is
//! deterministic (struct fields serialize in declaration order and all
//! containers iterate in canonical order), so equal values always produce
//! equal chunks, and therefore equal content hashes.

pub mod codec;
pub mod containers;
pub mod error;
pub mod types;
pub mod value;

pub use codec::{decode, encode};
pub use containers::{MapValue, SetValue};
pub use error::{ValueError, ValueResult};
pub use types::{StructType, Type};
pub use value::{RefValue, StructValue, Value};
