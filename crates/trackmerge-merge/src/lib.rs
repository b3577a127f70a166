//! Merge engine for trackmerge.
//!
//! Merges a read-only source tree into a mutable target tree in place. The
//! target keeps the identity of every node that is matched against the
//! source, either positionally or through a caller-supplied identity
//! function, and only fields that actually change are written.
//!
//! # Key Types
//!
//! - [`merge`] / [`merge_at`] / [`Merger`] — Entry points
//! - [`MergeOptions`] / [`Insertion`] — Per-call configuration
//! - [`TrackingPolicy`] / [`FieldTracker`] / [`track_by`] — Sequence matching
//! - [`WriteTarget`] / [`NodeTarget`] / [`WriteLog`] — Where writes land
//! - [`MergeError`] — Root kind mismatches and write target failures

pub mod error;
pub mod merger;
pub mod options;
pub mod target;
pub mod track;

pub use error::{MergeError, MergeResult, TargetError, TargetResult, WriteError};
pub use merger::{merge, merge_at, Merger};
pub use options::{Insertion, MergeOptions};
pub use target::{NodeTarget, RecordingTarget, WriteEvent, WriteLog, WriteOp, WriteTarget};
pub use track::{identity_fn, track_by, FieldTracker, IdentityFn, MaxDepth, TrackingPolicy};

pub use trackmerge_types::{IdentityKey, Key, Mapping, Node, NodeKind, Sequence, Value};
