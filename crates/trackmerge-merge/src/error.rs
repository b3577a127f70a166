//! Error types for the merge crate.

use trackmerge_types::NodeKind;

/// Error raised by a [`WriteTarget`](crate::WriteTarget).
///
/// Boxed so that caller-defined targets can surface their own error types;
/// the merge engine passes them through untouched.
pub type TargetError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias for write target results.
pub type TargetResult = Result<(), TargetError>;

/// Errors that can occur during a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The two roots are not the same kind of container.
    ///
    /// Nested mismatches are resolved by overwriting; only the root has no
    /// parent to write into.
    #[error("cannot merge a {source_kind} into a {target_kind} at depth {depth}")]
    KindMismatch {
        target_kind: NodeKind,
        source_kind: NodeKind,
        depth: usize,
    },

    /// A root value is a scalar.
    #[error("cannot merge into or from a {0}")]
    NotANode(&'static str),

    /// The write target rejected a write. The merge stopped at that write.
    #[error("write target failed: {0}")]
    Target(#[source] TargetError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors produced by the built-in [`NodeTarget`](crate::NodeTarget).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WriteError {
    /// A field write was aimed at a sequence, or an index write at a mapping.
    #[error("cannot write key {key} into a {node}")]
    KeyKind { key: String, node: NodeKind },

    /// A sequence-only operation was aimed at a mapping.
    #[error("cannot {operation} a {node}")]
    Unsupported {
        operation: &'static str,
        node: NodeKind,
    },
}
