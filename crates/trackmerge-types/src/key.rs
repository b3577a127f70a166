//! Keys used to address values and to match sequence elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The field name or index under which a value was reached in its parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Field(String),
    Index(usize),
}

impl Key {
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(field) => Some(field),
            Self::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Field(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.write_str(field),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(field: &str) -> Self {
        Self::Field(field.to_owned())
    }
}

impl From<String> for Key {
    fn from(field: String) -> Self {
        Self::Field(field)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Hashable identity of a sequence element.
///
/// Numbers follow same-value-zero semantics: `-0` and `+0` are the same key
/// and every `NaN` is the same key. Containers are identified by node
/// address, so two structurally equal but distinct nodes are different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Absent,
    Null,
    Bool(bool),
    Number(u64),
    String(String),
    Node(usize),
}

impl IdentityKey {
    /// Identity of a number under same-value-zero.
    pub fn number(n: f64) -> Self {
        let normalized = if n == 0.0 {
            0.0
        } else if n.is_nan() {
            f64::NAN
        } else {
            n
        };
        Self::Number(normalized.to_bits())
    }

    /// Identity of an arbitrary value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Absent => Self::Absent,
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::number(*n),
            Value::String(s) => Self::String(s.clone()),
            Value::Mapping(m) => Self::Node(m.addr()),
            Value::Sequence(s) => Self::Node(s.addr()),
        }
    }
}

impl From<&Value> for IdentityKey {
    fn from(value: &Value) -> Self {
        Self::of(value)
    }
}

impl From<Value> for IdentityKey {
    fn from(value: Value) -> Self {
        Self::of(&value)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for IdentityKey {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<usize> for IdentityKey {
    fn from(n: usize) -> Self {
        Self::number(n as f64)
    }
}

impl From<i64> for IdentityKey {
    fn from(n: i64) -> Self {
        Self::number(n as f64)
    }
}

impl From<f64> for IdentityKey {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}
