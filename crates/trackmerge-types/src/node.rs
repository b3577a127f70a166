//! Shared container nodes.
//!
//! [`Mapping`] and [`Sequence`] are cheap-to-clone handles around
//! `Rc<RefCell<..>>`. Cloning a handle never copies the contents; two handles
//! are "the same object" when [`ptr_eq`](Mapping::ptr_eq) holds. All accessors
//! take `&self` and release their borrow before returning, so callers can
//! freely read one node while writing another (or the same) node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::TypeError;
use crate::value::Value;

/// The two container kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    Sequence,
}

impl NodeKind {
    /// Lowercase name used in errors and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------

#[derive(Default)]
struct MappingData {
    class: Option<String>,
    entries: IndexMap<String, Value>,
}

/// Shared handle to a keyed container.
///
/// Entries keep insertion order. The optional class tag plays the role of a
/// nominal type: merging into a mapping never changes its tag, so callers can
/// check that a node is still "an instance of" what it was before.
#[derive(Clone, Default)]
pub struct Mapping(Rc<RefCell<MappingData>>);

impl Mapping {
    /// Create an empty, untagged mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mapping carrying a class tag.
    pub fn with_class(class: impl Into<String>) -> Self {
        let node = Self::new();
        node.0.borrow_mut().class = Some(class.into());
        node
    }

    /// Build a mapping from `(key, value)` pairs, in order.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let node = Self::new();
        {
            let mut data = node.0.borrow_mut();
            for (key, value) in entries {
                data.entries.insert(key.into(), value.into());
            }
        }
        node
    }

    /// The class tag, if any.
    pub fn class(&self) -> Option<String> {
        self.0.borrow().class.clone()
    }

    /// Replace the class tag.
    pub fn set_class(&self, class: Option<String>) {
        self.0.borrow_mut().class = class;
    }

    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().entries.is_empty()
    }

    /// Read a field. Missing fields read as [`Value::Absent`].
    pub fn get(&self, key: &str) -> Value {
        self.0
            .borrow()
            .entries
            .get(key)
            .cloned()
            .unwrap_or(Value::Absent)
    }

    /// Returns `true` if the field exists, even if it holds `Absent`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().entries.contains_key(key)
    }

    /// Set a field, returning the previous value if there was one.
    ///
    /// Existing fields keep their position; new fields are appended.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().entries.insert(key.into(), value.into())
    }

    /// Remove a field, preserving the order of the remaining ones.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().entries.shift_remove(key)
    }

    /// Field names in order.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().entries.keys().cloned().collect()
    }

    /// Snapshot of all entries in order. Container values are shared handles.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns `true` if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the node, stable for as long as any handle is alive.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        if let Some(class) = &data.class {
            write!(f, "{class} ")?;
        }
        f.debug_map().entries(data.entries.iter()).finish()
    }
}

// ---------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------

/// Shared handle to an ordered, index-addressable container.
#[derive(Clone, Default)]
pub struct Sequence(Rc<RefCell<Vec<Value>>>);

impl Sequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence from owned values.
    pub fn from_vec(values: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Read an element. Out-of-range indexes read as [`Value::Absent`].
    pub fn get(&self, index: usize) -> Value {
        self.0.borrow().get(index).cloned().unwrap_or(Value::Absent)
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Write an element, padding with `Absent` if `index` is past the end.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Absent);
        }
        items[index] = value.into();
    }

    /// Shorten the sequence to `len` elements. No-op if it is already shorter.
    pub fn truncate(&self, len: usize) {
        self.0.borrow_mut().truncate(len);
    }

    /// Replace the whole contents in one step, returning the old contents.
    pub fn replace_all(&self, values: Vec<Value>) -> Vec<Value> {
        std::mem::replace(&mut *self.0.borrow_mut(), values)
    }

    /// Snapshot of the elements. Container values are shared handles.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the node, stable for as long as any handle is alive.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------
// Node
// ---------------------------------------------------------------

/// Either container kind. This is what the merge engine recurses into.
#[derive(Clone, Debug)]
pub enum Node {
    Mapping(Mapping),
    Sequence(Sequence),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Mapping(_) => NodeKind::Mapping,
            Self::Sequence(_) => NodeKind::Sequence,
        }
    }

    /// Returns `true` if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => a.ptr_eq(b),
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn addr(&self) -> usize {
        match self {
            Self::Mapping(m) => m.addr(),
            Self::Sequence(s) => s.addr(),
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            Self::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(s) => Some(s),
            Self::Mapping(_) => None,
        }
    }

    /// Number of entries or elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Mapping(m) => m.len(),
            Self::Sequence(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Mapping> for Node {
    fn from(node: Mapping) -> Self {
        Self::Mapping(node)
    }
}

impl From<Sequence> for Node {
    fn from(node: Sequence) -> Self {
        Self::Sequence(node)
    }
}

impl TryFrom<Value> for Node {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_node().ok_or(TypeError::NotANode(value.kind_name()))
    }
}

impl TryFrom<Value> for Mapping {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Mapping(m) => Ok(m),
            other => Err(TypeError::UnexpectedKind {
                expected: NodeKind::Mapping,
                actual: other.kind_name(),
            }),
        }
    }
}

impl TryFrom<Value> for Sequence {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Sequence(s) => Ok(s),
            other => Err(TypeError::UnexpectedKind {
                expected: NodeKind::Sequence,
                actual: other.kind_name(),
            }),
        }
    }
}
