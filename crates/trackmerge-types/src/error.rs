use thiserror::Error;

use crate::node::NodeKind;

/// Errors produced by value operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a container node, got {0}")]
    NotANode(&'static str),

    #[error("expected a {expected} node, got {actual}")]
    UnexpectedKind {
        expected: NodeKind,
        actual: &'static str,
    },

    #[error("invalid json: {0}")]
    Json(String),
}

/// Convenience alias for value results.
pub type TypeResult<T> = Result<T, TypeError>;
