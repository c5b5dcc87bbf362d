use super::NodeId;

/// Structural edit of the hierarchy, described before it is applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// Rows `first..=last` will appear under `parent`
    Insert {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` under `parent` will disappear
    Remove {
        parent: NodeId,
        first: usize,
        last: usize,
    },
    /// Everything below the root is replaced
    Reset,
}

impl Change {
    pub const fn insert(parent: NodeId, first: usize, last: usize) -> Self {
        Self::Insert {
            parent,
            first,
            last,
        }
    }

    pub const fn remove(parent: NodeId, first: usize, last: usize) -> Self {
        Self::Remove {
            parent,
            first,
            last,
        }
    }
}
