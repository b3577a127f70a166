//! Sequence tracking policies.
//!
//! A [`TrackingPolicy`] is asked once per sequence the merge reaches. It
//! either returns `None`, in which case the two sequences are merged index by
//! index, or an [`IdentityFn`] that maps each element to an [`IdentityKey`],
//! in which case elements are matched by identity regardless of position.

use std::fmt;
use std::rc::Rc;

use trackmerge_types::{IdentityKey, Key, Sequence, Value};

/// Extracts the identity of a sequence element. Receives the element and its
/// index in the sequence it belongs to.
pub type IdentityFn = Rc<dyn Fn(&Value, usize) -> IdentityKey>;

/// Wrap a closure as an [`IdentityFn`].
pub fn identity_fn<F>(f: F) -> IdentityFn
where
    F: Fn(&Value, usize) -> IdentityKey + 'static,
{
    Rc::new(f)
}

/// Decides how each sequence is reconciled.
pub trait TrackingPolicy {
    /// Called with the recursion depth (0 at the root), the key under which
    /// the sequence was reached (`None` at the root and inside
    /// identity-matched elements), and the target and source sequences.
    fn track(
        &self,
        depth: usize,
        parent_key: Option<&Key>,
        target: &Sequence,
        source: &Sequence,
    ) -> Option<IdentityFn>;
}

impl<F> TrackingPolicy for F
where
    F: Fn(usize, Option<&Key>, &Sequence, &Sequence) -> Option<IdentityFn>,
{
    fn track(
        &self,
        depth: usize,
        parent_key: Option<&Key>,
        target: &Sequence,
        source: &Sequence,
    ) -> Option<IdentityFn> {
        self(depth, parent_key, target, source)
    }
}

/// How deep a [`FieldTracker`] keeps tracking by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxDepth {
    /// Track by identity at depths `0..=n`, positionally below.
    Limited(usize),
    /// Track by identity at every depth.
    Unlimited,
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self::Limited(0)
    }
}

impl From<Option<usize>> for MaxDepth {
    /// `None` means no limit.
    fn from(depth: Option<usize>) -> Self {
        depth.map_or(Self::Unlimited, Self::Limited)
    }
}

/// Tracks sequence elements by the value of one field.
#[derive(Clone)]
pub struct FieldTracker {
    field: String,
    max_depth: MaxDepth,
    identity: IdentityFn,
}

impl FieldTracker {
    /// Track by `field` at the root only.
    pub fn new(field: impl Into<String>) -> Self {
        Self::with_max_depth(field, MaxDepth::default())
    }

    pub fn with_max_depth(field: impl Into<String>, max_depth: MaxDepth) -> Self {
        let field = field.into();
        let lookup = field.clone();
        Self {
            field,
            max_depth,
            identity: identity_fn(move |value, _| IdentityKey::of(&value.get_field(&lookup))),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn max_depth(&self) -> MaxDepth {
        self.max_depth
    }

    /// The identity function this tracker hands out.
    pub fn identity(&self) -> IdentityFn {
        Rc::clone(&self.identity)
    }
}

impl fmt::Debug for FieldTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTracker")
            .field("field", &self.field)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl TrackingPolicy for FieldTracker {
    fn track(
        &self,
        depth: usize,
        _parent_key: Option<&Key>,
        _target: &Sequence,
        _source: &Sequence,
    ) -> Option<IdentityFn> {
        match self.max_depth {
            MaxDepth::Limited(max) if depth > max => None,
            _ => Some(self.identity()),
        }
    }
}

/// Build a policy that tracks elements by `field`.
///
/// Sequences at depths up to and including `max_depth` are matched by the
/// field's value; deeper ones are merged positionally. `None` tracks at every
/// depth. [`FieldTracker::new`] is the root-only shorthand.
pub fn track_by(field: impl Into<String>, max_depth: Option<usize>) -> FieldTracker {
    FieldTracker::with_max_depth(field, max_depth.into())
}
