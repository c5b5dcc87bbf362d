//! Node hierarchy mirroring an XML element tree
//!
//! Every XML element gets one element node. Under each element node sit the
//! rows a tree view shows for it: attribute rows, a text row and child
//! element rows, either directly ([`Layout::Flat`](crate::Layout::Flat)) or
//! grouped under three header rows ([`Layout::Grouped`](crate::Layout::Grouped)).
//!
//! The hierarchy owns the [`Document`](crate::xml::Document) it mirrors and
//! edits both in the same call. It knows nothing about views: structural
//! edits are announced through [`Change`] values computed by the `plan_*`
//! methods before anything is mutated.

mod change;
mod element;
mod kind;
mod tree;
mod validate;

pub use change::Change;
pub use kind::{Group, ItemFlags, NodeKind};
pub use tree::{Hierarchy, NodeId, COLUMN_COUNT};
