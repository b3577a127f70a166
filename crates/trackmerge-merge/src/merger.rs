//! The merge algorithm.
//!
//! [`merge`] walks the target tree `a` and the source tree `b` together and
//! rewrites `a` so that every path present in `b` holds `b`'s value.
//!
//! - Mappings: every field of `b` is reconciled; fields only in `a` stay.
//! - Sequences, positional: element `i` of `b` is reconciled with element
//!   `i` of `a`, then `a` is truncated to `b`'s length.
//! - Sequences, identity-tracked: each element of `b` is matched with the
//!   element of `a` that has the same identity key; matched containers are
//!   merged in place, everything else is taken from `b`, and `a`'s contents
//!   are replaced in one splice.
//!
//! A field is written only when its value changes. When both sides hold a
//! container of the same kind, the target container is merged into rather
//! than replaced, so its identity survives. A container facing a scalar, or
//! a mapping facing a sequence, is overwritten wholesale.
//!
//! # Invariants
//!
//! - `b` is never written to.
//! - No `RefCell` borrow is held across a recursive call or a write, so
//!   aliased trees (including a node merged into itself) are safe.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use trackmerge_types::{IdentityKey, Key, Mapping, Node, Sequence, Value};

use crate::error::{MergeError, MergeResult};
use crate::options::MergeOptions;
use crate::target::WriteTarget;
use crate::track::IdentityFn;

/// Merge `b` into `a` in place.
pub fn merge(a: &Node, b: &Node, opts: &MergeOptions) -> MergeResult<()> {
    merge_at(a, b, opts, 0, None)
}

/// Merge `b` into `a` as if reached at `depth` under `parent_key`.
///
/// `depth` and `parent_key` are what the tracking policy sees for sequences
/// at this level; [`merge`] starts at depth 0 with no parent key.
pub fn merge_at(
    a: &Node,
    b: &Node,
    opts: &MergeOptions,
    depth: usize,
    parent_key: Option<&Key>,
) -> MergeResult<()> {
    if a.kind() != b.kind() {
        warn!(
            target_kind = %a.kind(),
            source_kind = %b.kind(),
            depth,
            "refusing to merge nodes of different kinds"
        );
        return Err(MergeError::KindMismatch {
            target_kind: a.kind(),
            source_kind: b.kind(),
            depth,
        });
    }
    Level::new(a, opts, depth).merge_node(b, parent_key)
}

/// Convenience wrapper that owns its options.
#[derive(Debug, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn merge(&self, a: &Node, b: &Node) -> MergeResult<()> {
        merge(a, b, &self.options)
    }

    /// Merge two values whose roots must both be containers.
    pub fn merge_values(&self, a: &Value, b: &Value) -> MergeResult<()> {
        let a = a.as_node().ok_or(MergeError::NotANode(a.kind_name()))?;
        let b = b.as_node().ok_or(MergeError::NotANode(b.kind_name()))?;
        self.merge(&a, &b)
    }
}

/// State for merging into one target node.
///
/// The write target is built on the first write and reused for the rest of
/// this node's merge.
struct Level<'a> {
    node: &'a Node,
    opts: &'a MergeOptions,
    depth: usize,
    target: Option<Box<dyn WriteTarget>>,
}

impl<'a> Level<'a> {
    fn new(node: &'a Node, opts: &'a MergeOptions, depth: usize) -> Self {
        Self {
            node,
            opts,
            depth,
            target: None,
        }
    }

    fn target(&mut self) -> &mut Box<dyn WriteTarget> {
        let (node, opts) = (self.node, self.opts);
        self.target.get_or_insert_with(|| opts.resolve_target(node))
    }

    fn merge_node(&mut self, b: &Node, parent_key: Option<&Key>) -> MergeResult<()> {
        if self.node.ptr_eq(b) {
            trace!(depth = self.depth, "node merged into itself");
            return Ok(());
        }
        match (self.node, b) {
            (Node::Mapping(a), Node::Mapping(b)) => self.merge_mapping(a, b),
            (Node::Sequence(a), Node::Sequence(b)) => {
                match self.opts.identity_for(self.depth, parent_key, a, b) {
                    Some(identity) => self.merge_tracked(a, b, &identity),
                    None => self.merge_positional(a, b),
                }
            }
            // Kinds are checked by `merge_at`.
            _ => Ok(()),
        }
    }

    fn merge_mapping(&mut self, a: &Mapping, b: &Mapping) -> MergeResult<()> {
        for (field, b_value) in b.entries() {
            let a_value = a.get(&field);
            self.merge_value(a_value, b_value, Key::Field(field))?;
        }
        Ok(())
    }

    fn merge_positional(&mut self, a: &Sequence, b: &Sequence) -> MergeResult<()> {
        let b_items = b.to_vec();
        let b_len = b_items.len();
        debug!(depth = self.depth, a_len = a.len(), b_len, "merging sequence by position");

        for (index, b_value) in b_items.into_iter().enumerate() {
            self.merge_value(a.get(index), b_value, Key::Index(index))?;
        }

        if a.len() != b_len {
            debug!(depth = self.depth, len = b_len, "truncating sequence");
            self.target().truncate(b_len).map_err(MergeError::Target)?;
        }
        Ok(())
    }

    fn merge_tracked(&mut self, a: &Sequence, b: &Sequence, identity: &IdentityFn) -> MergeResult<()> {
        let a_items = a.to_vec();
        let b_items = b.to_vec();

        // Later elements overwrite earlier ones with the same identity.
        let mut by_identity: HashMap<IdentityKey, Value> = HashMap::with_capacity(a_items.len());
        for (index, a_value) in a_items.iter().enumerate() {
            by_identity.insert(identity(a_value, index), a_value.clone());
        }

        let mut matched = 0usize;
        let mut merged = Vec::with_capacity(b_items.len());
        for (index, b_value) in b_items.into_iter().enumerate() {
            let next = match by_identity.get(&identity(&b_value, index)) {
                Some(a_value) if a_value.is_truthy() => {
                    match (a_value.as_node(), b_value.as_node()) {
                        (Some(a_node), Some(b_node)) if a_node.kind() == b_node.kind() => {
                            merge_at(&a_node, &b_node, self.opts, self.depth + 1, None)?;
                            matched += 1;
                            a_value.clone()
                        }
                        _ => self.opts.insertion.prepare(b_value),
                    }
                }
                _ => self.opts.insertion.prepare(b_value),
            };
            merged.push(next);
        }

        debug!(
            depth = self.depth,
            a_len = a_items.len(),
            b_len = merged.len(),
            matched,
            "merged sequence by identity"
        );

        let current = a.to_vec();
        let unchanged = current.len() == merged.len()
            && current.iter().zip(&merged).all(|(old, new)| old.strict_eq(new));
        if unchanged {
            trace!(depth = self.depth, "tracked sequence already in order");
            return Ok(());
        }

        self.target().splice(merged).map_err(MergeError::Target)
    }

    /// Reconcile one field or index.
    fn merge_value(&mut self, a_value: Value, b_value: Value, key: Key) -> MergeResult<()> {
        if let (Some(b_node), false) = (b_value.as_node(), a_value.is_absent()) {
            match a_value.as_node() {
                Some(a_node) if a_node.kind() == b_node.kind() => {
                    return merge_at(&a_node, &b_node, self.opts, self.depth + 1, Some(&key));
                }
                _ => trace!(
                    depth = self.depth,
                    key = %key,
                    from = a_value.kind_name(),
                    to = b_value.kind_name(),
                    "replacing value of a different kind"
                ),
            }
        }

        if a_value.strict_eq(&b_value) {
            return Ok(());
        }

        trace!(depth = self.depth, key = %key, "write");
        let value = self.opts.insertion.prepare(b_value);
        self.target().set(&key, value).map_err(MergeError::Target)
    }
}
