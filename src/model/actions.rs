//! Context-menu actions

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::{EtreeModel, ModelIndex, ModelObserver};
use crate::error::{Error, ErrorKind};
use crate::hierarchy::NodeKind;

/// Command a view offers for one row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    RemoveAttribute,
    AddAttribute,
    AddChild,
    AddParent,
    Remove,
    Delete,
}

impl Action {
    pub const ALL: [Self; 6] = [
        Self::RemoveAttribute,
        Self::AddAttribute,
        Self::AddChild,
        Self::AddParent,
        Self::Remove,
        Self::Delete,
    ];

    /// Menu label
    pub const fn label(self) -> &'static str {
        match self {
            Self::RemoveAttribute => "Remove Attribute",
            Self::AddAttribute => "Add Attribute",
            Self::AddChild => "Add Child",
            Self::AddParent => "Add Parent",
            Self::Remove => "Remove",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = Error;

    /// Labels match case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| {
                Error::detached(ErrorKind::InvalidCommand {
                    command: label.to_string(),
                })
            })
    }
}

impl<O: ModelObserver> EtreeModel<O> {
    /// Actions offered for the row at `index`
    pub fn context_actions(&self, index: &ModelIndex) -> Vec<Action> {
        match self.node_kind(index) {
            Some(NodeKind::Attribute { .. }) => vec![Action::RemoveAttribute],
            Some(NodeKind::Element(_)) => vec![
                Action::AddAttribute,
                Action::AddChild,
                Action::AddParent,
                Action::Remove,
                Action::Delete,
            ],
            _ => Vec::new(),
        }
    }

    /// Run `action` on the row at `index` if that row offers it
    pub fn trigger(&mut self, index: &ModelIndex, action: Action) -> bool {
        if !self.context_actions(index).contains(&action) {
            debug!(%action, "action not offered here");
            return false;
        }
        match action {
            Action::RemoveAttribute => {
                let Some(node) = index.node() else {
                    return false;
                };
                let Some(NodeKind::Attribute { key }) = self.tree.kind(node).cloned() else {
                    return false;
                };
                let Some(owner) = self.tree.enclosing_element(node) else {
                    return false;
                };
                let owner = self.index_of(owner);
                self.remove_attribute(&owner, &key)
            }
            Action::AddAttribute => {
                let key = self.tree.config().new_attribute_key.clone();
                self.add_attribute(index, &key, "")
            }
            Action::AddChild => self.add_child_element(index),
            Action::AddParent => self.add_parent_element(index),
            Action::Remove => self.remove_element(index),
            Action::Delete => self.delete_element(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, ModelConfig};
    use crate::model::Role;
    use crate::xml::Element;

    #[test]
    fn test_labels_parse_back() {
        for action in Action::ALL {
            assert_eq!(action.label().parse::<Action>().ok(), Some(action));
        }
        assert_eq!("add child".parse::<Action>().ok(), Some(Action::AddChild));
        assert!("Rename".parse::<Action>().is_err());
    }

    #[test]
    fn test_offered_actions() {
        let root = Element::new("r").with_attribute("k", "v");
        let model = EtreeModel::with_config(root, ModelConfig::default().with_layout(Layout::Flat));
        let element = model.root_index();
        assert_eq!(model.context_actions(&element).len(), 5);
        let attribute = model.index(0, 0, &element);
        assert_eq!(model.context_actions(&attribute), [Action::RemoveAttribute]);
        let text = model.index(1, 0, &element);
        assert!(model.context_actions(&text).is_empty());
    }

    #[test]
    fn test_trigger() {
        let root = Element::new("r").with_attribute("k", "v");
        let mut model = EtreeModel::with_config(root, ModelConfig::default());
        let element = model.root_index();
        let attributes = model.index(0, 0, &element);

        assert!(model.trigger(&element, Action::AddAttribute));
        let added = model.index(1, 0, &attributes);
        assert_eq!(model.data(&added, Role::Display), Some("NewAttribute"));
        assert_eq!(model.data(&added.sibling_column(1), Role::Display), Some(""));

        let first = model.index(0, 0, &attributes);
        assert!(!model.trigger(&first, Action::Delete));
        assert!(model.trigger(&first, Action::RemoveAttribute));
        assert_eq!(model.row_count(&attributes), 1);
        assert!(model.hierarchy().validate().is_ok());
    }
}
