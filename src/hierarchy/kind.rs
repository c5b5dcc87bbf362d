use bitflags::bitflags;

use crate::xml::ElementId;

bitflags! {
    /// Capabilities of one cell, as reported to a view
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        const ENABLED    = 0b001;
        const SELECTABLE = 0b010;
        const EDITABLE   = 0b100;
    }
}

/// Category of rows gathered under a header node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    Attributes,
    Text,
    Children,
}

impl Group {
    /// Header order under an element node
    pub const ALL: [Self; 3] = [Self::Attributes, Self::Text, Self::Children];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Attributes => "Attributes:",
            Self::Text => "Text:",
            Self::Children => "Children:",
        }
    }
}

/// What a node stands for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Invisible sentinel above the document root element
    Root,
    Element(ElementId),
    /// One entry of the enclosing element's attribute map
    Attribute { key: String },
    /// The enclosing element's text
    Text,
    Header(Group),
}

impl NodeKind {
    /// Whether the generic child insertion/removal contract applies
    pub const fn accepts_children(&self) -> bool {
        matches!(self, Self::Root | Self::Element(_))
    }

    pub const fn element(&self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(*id),
            _ => None,
        }
    }

    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn flags(&self, column: usize) -> ItemFlags {
        let all = ItemFlags::ENABLED | ItemFlags::SELECTABLE | ItemFlags::EDITABLE;
        match (self, column) {
            (Self::Root, _) => ItemFlags::ENABLED,
            (Self::Element(_), 0) | (Self::Attribute { .. }, _) | (Self::Text, 1) => all,
            (Self::Element(_), _) | (Self::Header(_), _) => {
                ItemFlags::ENABLED | ItemFlags::SELECTABLE
            }
            (Self::Text, _) => ItemFlags::ENABLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(NodeKind::Root.accepts_children());
        assert!(!NodeKind::Text.accepts_children());
        assert!(!NodeKind::Header(Group::Children).accepts_children());
        assert!(!NodeKind::Attribute {
            key: "k".to_string()
        }
        .accepts_children());
    }

    #[test]
    fn test_flags() {
        let attribute = NodeKind::Attribute {
            key: "k".to_string(),
        };
        assert!(attribute.flags(0).contains(ItemFlags::EDITABLE));
        assert!(attribute.flags(1).contains(ItemFlags::EDITABLE));
        assert!(!NodeKind::Text.flags(0).contains(ItemFlags::EDITABLE));
        assert!(NodeKind::Text.flags(1).contains(ItemFlags::EDITABLE));
        assert!(!NodeKind::Header(Group::Text)
            .flags(0)
            .contains(ItemFlags::EDITABLE));
    }

    #[test]
    fn test_group_labels() {
        let labels: Vec<_> = Group::ALL.iter().map(|g| g.label()).collect();
        assert_eq!(labels, ["Attributes:", "Text:", "Children:"]);
    }
}
