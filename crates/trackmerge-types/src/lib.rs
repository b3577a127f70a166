//! Value model for trackmerge.
//!
//! This crate defines the tree that the merge engine reconciles. Scalars are
//! plain values; mappings and sequences are shared, reference-identified
//! nodes so that "the same object" is observable after a merge.
//!
//! # Key Types
//!
//! - [`Value`] — Tagged value: absent marker, scalars, or a container node
//! - [`Mapping`] — Shared, insertion-ordered keyed node with an optional class tag
//! - [`Sequence`] — Shared, index-addressable node
//! - [`Node`] / [`NodeKind`] — Either container kind
//! - [`Key`] — Field name or index under which a value was reached
//! - [`IdentityKey`] — Hashable identity used to match sequence elements

pub mod error;
pub mod json;
pub mod key;
pub mod node;
pub mod value;

pub use error::{TypeError, TypeResult};
pub use key::{IdentityKey, Key};
pub use node::{Mapping, Node, NodeKind, Sequence};
pub use value::Value;
