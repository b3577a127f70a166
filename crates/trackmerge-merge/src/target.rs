//! Write targets: where the merge engine's writes land.
//!
//! Every change the engine decides on is one call on a [`WriteTarget`]:
//! one `set` per changed field or index, one `truncate` per shrunk
//! positional sequence, one `splice` per rewritten identity-tracked
//! sequence. Unchanged values produce no call at all, so a target that
//! notifies observers sees exactly the real changes.

use std::cell::RefCell;
use std::rc::Rc;

use trackmerge_types::{Key, Node, NodeKind, Value};

use crate::error::{TargetResult, WriteError};

/// The writable view of one mapping or sequence node.
pub trait WriteTarget {
    /// Write one field (mappings) or one index (sequences).
    ///
    /// An index past the end of a sequence extends it.
    fn set(&mut self, key: &Key, value: Value) -> TargetResult;

    /// Shorten a sequence to `len` elements.
    fn truncate(&mut self, len: usize) -> TargetResult;

    /// Replace the entire contents of a sequence in one operation.
    fn splice(&mut self, values: Vec<Value>) -> TargetResult;
}

/// Writes straight into the node. This is the default target.
#[derive(Clone, Debug)]
pub struct NodeTarget {
    node: Node,
}

impl NodeTarget {
    pub fn new(node: impl Into<Node>) -> Self {
        Self { node: node.into() }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl WriteTarget for NodeTarget {
    fn set(&mut self, key: &Key, value: Value) -> TargetResult {
        match (&self.node, key) {
            (Node::Mapping(m), Key::Field(field)) => {
                m.insert(field.clone(), value);
            }
            (Node::Sequence(s), Key::Index(index)) => s.set(*index, value),
            (node, key) => {
                return Err(WriteError::KeyKind {
                    key: key.to_string(),
                    node: node.kind(),
                }
                .into())
            }
        }
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> TargetResult {
        match &self.node {
            Node::Sequence(s) => {
                s.truncate(len);
                Ok(())
            }
            Node::Mapping(_) => Err(WriteError::Unsupported {
                operation: "truncate",
                node: NodeKind::Mapping,
            }
            .into()),
        }
    }

    fn splice(&mut self, values: Vec<Value>) -> TargetResult {
        match &self.node {
            Node::Sequence(s) => {
                s.replace_all(values);
                Ok(())
            }
            Node::Mapping(_) => Err(WriteError::Unsupported {
                operation: "splice",
                node: NodeKind::Mapping,
            }
            .into()),
        }
    }
}

// ---------------------------------------------------------------
// Recording
// ---------------------------------------------------------------

/// One recorded write operation.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    Set { key: Key, value: Value },
    Truncate { len: usize },
    Splice { len: usize },
}

/// A write observed by a [`RecordingTarget`].
#[derive(Clone, Debug, PartialEq)]
pub struct WriteEvent {
    /// Address of the node the target was built for.
    pub node: usize,
    /// Kind of that node.
    pub kind: NodeKind,
    pub op: WriteOp,
}

/// Shared log of writes. Cloning the log shares it.
#[derive(Clone, Debug, Default)]
pub struct WriteLog(Rc<RefCell<Vec<WriteEvent>>>);

impl WriteLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<WriteEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of `set` writes aimed at `key` on the given node.
    pub fn sets_at(&self, node: &Node, key: &Key) -> usize {
        let addr = node.addr();
        self.0
            .borrow()
            .iter()
            .filter(|e| e.node == addr && matches!(&e.op, WriteOp::Set { key: k, .. } if k == key))
            .count()
    }

    /// A `wrap_target` function that applies every write to the node and
    /// then records it into this log.
    pub fn recorder(&self) -> impl Fn(&Node) -> Box<dyn WriteTarget> + 'static {
        let log = self.clone();
        move |node: &Node| -> Box<dyn WriteTarget> {
            Box::new(RecordingTarget::new(
                log.clone(),
                node,
                Box::new(NodeTarget::new(node.clone())),
            ))
        }
    }

    fn push(&self, event: WriteEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// Forwards writes to an inner target and records each one the inner target
/// accepts. Rejected writes are not logged.
pub struct RecordingTarget {
    log: WriteLog,
    node: usize,
    kind: NodeKind,
    inner: Box<dyn WriteTarget>,
}

impl RecordingTarget {
    pub fn new(log: WriteLog, node: &Node, inner: Box<dyn WriteTarget>) -> Self {
        Self {
            log,
            node: node.addr(),
            kind: node.kind(),
            inner,
        }
    }

    fn record(&self, op: WriteOp) {
        self.log.push(WriteEvent {
            node: self.node,
            kind: self.kind,
            op,
        });
    }
}

impl WriteTarget for RecordingTarget {
    fn set(&mut self, key: &Key, value: Value) -> TargetResult {
        let op = WriteOp::Set {
            key: key.clone(),
            value: value.clone(),
        };
        self.inner.set(key, value)?;
        self.record(op);
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> TargetResult {
        self.inner.truncate(len)?;
        self.record(WriteOp::Truncate { len });
        Ok(())
    }

    fn splice(&mut self, values: Vec<Value>) -> TargetResult {
        let len = values.len();
        self.inner.splice(values)?;
        self.record(WriteOp::Splice { len });
        Ok(())
    }
}
