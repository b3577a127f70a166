//! The tagged value type.

use std::fmt;

use crate::key::Key;
use crate::node::{Mapping, Node, Sequence};

/// Any mergeable datum.
///
/// `Absent` is distinct from `Null`: it is what a read of a missing field or
/// an out-of-range index produces, and the merge engine treats it as "there
/// is nothing here to merge into".
///
/// `Clone` is shallow for containers: the clone is another handle to the
/// same node. Use [`Value::deep_clone`] for a detached copy.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Sequence),
    Mapping(Mapping),
}

impl Value {
    /// Short name of the variant, used in errors and log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for mappings and sequences.
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Mapping(_) | Self::Sequence(_))
    }

    /// Returns `false` for `Absent`, `Null`, `false`, `0`, `-0`, `NaN` and
    /// the empty string. Every container is truthy, even an empty one.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Sequence(_) | Self::Mapping(_) => true,
        }
    }

    /// Another handle to the container, if this value is one.
    pub fn as_node(&self) -> Option<Node> {
        match self {
            Self::Mapping(m) => Some(Node::Mapping(m.clone())),
            Self::Sequence(s) => Some(Node::Sequence(s.clone())),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strict equality: scalars by value, containers by handle identity.
    ///
    /// `NaN` is not strictly equal to itself and `Absent` is not equal to
    /// `Null`. Two structurally equal but distinct nodes are not strictly
    /// equal; use `==` for structural comparison.
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a.ptr_eq(b),
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns `true` if both values are the same container node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => a.ptr_eq(b),
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Read one level down. Fields of non-mappings and indexes of
    /// non-sequences read as `Absent`.
    pub fn get(&self, key: &Key) -> Value {
        match (self, key) {
            (Self::Mapping(m), Key::Field(field)) => m.get(field),
            (Self::Sequence(s), Key::Index(index)) => s.get(*index),
            _ => Value::Absent,
        }
    }

    /// Read a field by name. For sequences a numeric name addresses an index.
    pub fn get_field(&self, field: &str) -> Value {
        match self {
            Self::Mapping(m) => m.get(field),
            Self::Sequence(s) => field
                .parse::<usize>()
                .map(|index| s.get(index))
                .unwrap_or(Value::Absent),
            _ => Value::Absent,
        }
    }

    /// Follow a path of keys from this value.
    pub fn get_path(&self, path: &[Key]) -> Value {
        path.iter()
            .fold(self.clone(), |current, key| current.get(key))
    }

    /// Copy the whole tree into fresh nodes. Class tags are preserved.
    pub fn deep_clone(&self) -> Value {
        match self {
            Self::Mapping(m) => {
                let copy = Mapping::new();
                copy.set_class(m.class());
                for (key, value) in m.entries() {
                    copy.insert(key, value.deep_clone());
                }
                Self::Mapping(copy)
            }
            Self::Sequence(s) => Self::Sequence(s.to_vec().iter().map(Value::deep_clone).collect()),
            scalar => scalar.clone(),
        }
    }
}

/// Structural equality.
///
/// Mappings compare by entries regardless of order and ignore class tags;
/// sequences compare element-wise. Scalars compare by value, so `NaN` is not
/// equal to itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.entries(), b.entries());
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter().any(|(other_key, other)| key == other_key && value == other)
                    })
            }
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            _ => self.strict_eq(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Sequence(s) => fmt::Debug::fmt(s, f),
            Self::Mapping(m) => fmt::Debug::fmt(m, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(node: Mapping) -> Self {
        Self::Mapping(node)
    }
}

impl From<Sequence> for Value {
    fn from(node: Sequence) -> Self {
        Self::Sequence(node)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Mapping(m) => Self::Mapping(m),
            Node::Sequence(s) => Self::Sequence(s),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Absent,
            Value::Null,
            Value::from(false),
            Value::from(0),
            Value::from(-0.0),
            Value::from(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::from(true),
            Value::from(-1),
            Value::from("0"),
            Value::from(Mapping::new()),
            Value::from(Sequence::new()),
        ] {
            assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn strict_eq_scalars() {
        assert!(Value::from(1).strict_eq(&Value::from(1.0)));
        assert!(Value::from("a").strict_eq(&Value::from("a")));
        assert!(!Value::from(1).strict_eq(&Value::from("1")));
        assert!(!Value::Absent.strict_eq(&Value::Null));
        assert!(!Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
        assert!(Value::from(0.0).strict_eq(&Value::from(-0.0)));
    }

    #[test]
    fn strict_eq_containers_by_identity() {
        let m = Mapping::from_entries([("a", 1)]);
        let same = Value::from(m.clone());
        let copy = Value::from(m.clone()).deep_clone();
        assert!(Value::from(m.clone()).strict_eq(&same));
        assert!(!same.strict_eq(&copy));
        assert_eq!(same, copy);
    }

    #[test]
    fn structural_eq_ignores_key_order_and_class() {
        let a = Mapping::from_entries([("x", 1), ("y", 2)]);
        let b = Mapping::with_class("Point");
        b.insert("y", 2);
        b.insert("x", 1);
        assert_eq!(Value::from(a), Value::from(b));
    }

    #[test]
    fn structural_eq_detects_extra_keys() {
        let a = Mapping::from_entries([("x", 1)]);
        let b = Mapping::from_entries([("x", Value::from(1)), ("y", Value::Absent)]);
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn deep_clone_detaches_nodes() {
        let inner = Sequence::from_vec(vec![Value::from(1)]);
        let outer = Mapping::with_class("Outer");
        outer.insert("items", inner.clone());

        let copy = Value::from(outer.clone()).deep_clone();
        let copy_map = copy.as_mapping().unwrap();
        assert_eq!(copy_map.class().as_deref(), Some("Outer"));
        assert!(!copy_map.ptr_eq(&outer));
        assert!(!copy_map.get("items").ptr_eq(&Value::from(inner.clone())));

        inner.push(2);
        assert_eq!(copy_map.get("items").as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn get_field_and_path() {
        let child = Mapping::from_entries([("id", 7)]);
        let list = Sequence::from_vec(vec![Value::from(child)]);
        let root = Value::from(Mapping::from_entries([("children", list)]));

        let path = [Key::from("children"), Key::from(0usize), Key::from("id")];
        assert_eq!(root.get_path(&path), Value::from(7));
        assert!(root.get_path(&[Key::from("nope"), Key::from(0usize)]).is_absent());

        let list = root.get_field("children");
        assert_eq!(list.get_field("0").get_field("id"), Value::from(7));
        assert!(list.get_field("x").is_absent());
        assert!(Value::from(3).get_field("id").is_absent());
    }

    #[test]
    fn debug_format() {
        let v = Value::from(vec![Value::from(1), Value::Null, Value::from("s")]);
        assert_eq!(format!("{v:?}"), "[1, null, \"s\"]");
        assert_eq!(format!("{:?}", Value::Absent), "absent");
    }

    #[test]
    fn option_converts_to_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(2)), Value::from(2));
    }
}
