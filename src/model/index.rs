use crate::hierarchy::NodeId;

/// Address of one cell: a node plus a row and column
///
/// The default index is invalid and stands for the invisible root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: Option<NodeId>,
}

impl ModelIndex {
    pub(crate) const fn new(row: usize, column: usize, node: NodeId) -> Self {
        Self {
            row,
            column,
            node: Some(node),
        }
    }

    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            node: None,
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub const fn column(&self) -> usize {
        self.column
    }

    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Same row and node, another column
    pub const fn sibling_column(&self, column: usize) -> Self {
        Self {
            row: self.row,
            column,
            node: self.node,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Text shown in the cell
    Display,
    /// Text put in the editor when editing starts
    Edit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}
