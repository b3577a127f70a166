//! Per-call merge configuration.

use std::fmt;

use trackmerge_types::{IdentityKey, Key, Node, Sequence, Value};

use crate::target::{NodeTarget, WriteTarget};
use crate::track::{IdentityFn, TrackingPolicy};

type WrapTargetFn = dyn Fn(&Node) -> Box<dyn WriteTarget>;

/// How values that are new to the target are inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Insertion {
    /// Insert the source's own handle. The target then shares that node with
    /// the source, so a later merge into the target can write into it.
    #[default]
    Share,
    /// Insert a deep copy, so the target never aliases the source.
    Detach,
}

impl Insertion {
    pub(crate) fn prepare(self, value: Value) -> Value {
        match self {
            Self::Share => value,
            Self::Detach => value.deep_clone(),
        }
    }
}

/// Configuration for a merge.
///
/// The default merges every sequence positionally, writes straight into the
/// target nodes, and shares inserted nodes with the source.
#[derive(Default)]
pub struct MergeOptions {
    /// Chooses positional or identity matching for each sequence.
    pub track_by: Option<Box<dyn TrackingPolicy>>,
    /// Builds the writable view of a node. Called at most once per node per
    /// merge level, and only when that level actually writes.
    pub wrap_target: Option<Box<WrapTargetFn>>,
    pub insertion: Insertion,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track_by(mut self, policy: impl TrackingPolicy + 'static) -> Self {
        self.track_by = Some(Box::new(policy));
        self
    }

    /// Use a closure over the full `(depth, parent_key, target, source)`
    /// signature as the tracking policy.
    pub fn with_track_by_fn<F>(self, policy: F) -> Self
    where
        F: Fn(usize, Option<&Key>, &Sequence, &Sequence) -> Option<IdentityFn> + 'static,
    {
        self.with_track_by(policy)
    }

    /// Track every sequence with the same identity function.
    pub fn with_identity<F>(self, identity: F) -> Self
    where
        F: Fn(&Value, usize) -> IdentityKey + 'static,
    {
        let identity: IdentityFn = std::rc::Rc::new(identity);
        self.with_track_by_fn(move |_, _, _, _| Some(identity.clone()))
    }

    pub fn with_wrap_target<F>(mut self, wrap: F) -> Self
    where
        F: Fn(&Node) -> Box<dyn WriteTarget> + 'static,
    {
        self.wrap_target = Some(Box::new(wrap));
        self
    }

    pub fn with_insertion(mut self, insertion: Insertion) -> Self {
        self.insertion = insertion;
        self
    }

    pub(crate) fn identity_for(
        &self,
        depth: usize,
        parent_key: Option<&Key>,
        target: &Sequence,
        source: &Sequence,
    ) -> Option<IdentityFn> {
        self.track_by
            .as_ref()
            .and_then(|policy| policy.track(depth, parent_key, target, source))
    }

    pub(crate) fn resolve_target(&self, node: &Node) -> Box<dyn WriteTarget> {
        match &self.wrap_target {
            Some(wrap) => wrap(node),
            None => Box::new(NodeTarget::new(node.clone())),
        }
    }
}

impl fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("track_by", &self.track_by.is_some())
            .field("wrap_target", &self.wrap_target.is_some())
            .field("insertion", &self.insertion)
            .finish()
    }
}
