//! Element-node operations that edit the XML and the nodes together

use tracing::debug;

use super::change::Change;
use super::kind::{Group, NodeKind};
use super::tree::{Hierarchy, NodeId};
use crate::config::Layout;
use crate::xml::{is_valid_name, Element, ElementId};

impl Hierarchy {
    /// Node whose children are the attribute rows of `element`
    pub fn attribute_container(&self, element: NodeId) -> Option<NodeId> {
        self.container(element, Group::Attributes)
    }

    /// Node whose children include the child element rows of `element`
    pub fn children_container(&self, element: NodeId) -> Option<NodeId> {
        self.container(element, Group::Children)
    }

    fn container(&self, element: NodeId, group: Group) -> Option<NodeId> {
        if !self.kind(element)?.is_element() {
            return None;
        }
        match self.layout() {
            Layout::Flat => Some(element),
            Layout::Grouped => self
                .children(element)
                .iter()
                .copied()
                .find(|&child| self.kind(child) == Some(&NodeKind::Header(group))),
        }
    }

    /// Element node owning a children container, if `container` is one
    fn children_owner(&self, container: NodeId) -> Option<NodeId> {
        match (self.kind(container)?, self.layout()) {
            (NodeKind::Element(_), Layout::Flat) => Some(container),
            (NodeKind::Header(Group::Children), Layout::Grouped) => self.parent(container),
            _ => None,
        }
    }

    /// Rows before the first element row of a children container
    fn element_row_offset(&self, container: NodeId) -> usize {
        self.children(container)
            .iter()
            .take_while(|&&child| !self.kind(child).is_some_and(NodeKind::is_element))
            .count()
    }

    pub fn attribute_count(&self, element: NodeId) -> usize {
        self.element_of(element)
            .and_then(|id| self.doc.attributes(id))
            .map_or(0, |attributes| attributes.len())
    }

    /// Element-node children of `element`, in document order
    pub fn element_children(&self, element: NodeId) -> Vec<NodeId> {
        self.children_container(element)
            .map(|container| {
                self.children(container)
                    .iter()
                    .copied()
                    .filter(|&child| self.kind(child).is_some_and(NodeKind::is_element))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Position of `element`'s XML element among its XML siblings
    pub fn element_row(&self, element: NodeId) -> Option<usize> {
        let id = self.element_of(element)?;
        let parent = self.doc.parent(id)?;
        self.doc.position(parent, id)
    }

    pub fn attribute_node_by_key(&self, element: NodeId, key: &str) -> Option<NodeId> {
        let container = self.attribute_container(element)?;
        self.children(container).iter().copied().find(|&child| {
            matches!(self.kind(child), Some(NodeKind::Attribute { key: k }) if k == key)
        })
    }

    /// Key that `add_attribute` would store for a requested `key`
    fn disambiguate_key(&self, element: ElementId, key: &str) -> Option<String> {
        let attributes = self.doc.attributes(element)?;
        let suffix = self.config.duplicate_key_suffix.as_str();
        let mut candidate = key.to_string();
        while attributes.contains_key(&candidate) {
            if suffix.is_empty() {
                return None;
            }
            candidate.push_str(suffix);
        }
        Some(candidate)
    }

    pub fn plan_add_attribute(&self, element: NodeId, key: &str) -> Option<Change> {
        if !is_valid_name(key) {
            return None;
        }
        self.disambiguate_key(self.element_of(element)?, key)?;
        let container = self.attribute_container(element)?;
        let row = self.attribute_count(element);
        Some(Change::insert(container, row, row))
    }

    /// Add an attribute, suffixing the key while it collides. The new row
    /// goes after the existing attribute rows.
    pub fn add_attribute(&mut self, element: NodeId, key: &str, value: &str) -> Option<NodeId> {
        if !is_valid_name(key) {
            return None;
        }
        let id = self.element_of(element)?;
        let container = self.attribute_container(element)?;
        let key = self.disambiguate_key(id, key)?;
        let row = self.attribute_count(element);

        self.doc
            .attributes_mut(id)?
            .insert(key.clone(), value.to_string());
        let node = self.alloc(NodeKind::Attribute { key });
        self.attach(container, row, node);
        Some(node)
    }

    pub fn plan_remove_attribute(&self, element: NodeId, key: &str) -> Option<Change> {
        let node = self.attribute_node_by_key(element, key)?;
        let container = self.parent(node)?;
        let row = self.row_in_parent(node)?;
        Some(Change::remove(container, row, row))
    }

    pub fn remove_attribute(&mut self, element: NodeId, key: &str) -> bool {
        let (Some(id), Some(node)) = (
            self.element_of(element),
            self.attribute_node_by_key(element, key),
        ) else {
            return false;
        };
        self.detach(node);
        self.discard(node);
        self.doc
            .attributes_mut(id)
            .is_some_and(|attributes| attributes.shift_remove(key).is_some())
    }

    pub fn plan_add_child_element(&self, element: NodeId) -> Option<Change> {
        let container = self.children_container(element)?;
        let row = self.child_count(container);
        Some(Change::insert(container, row, row))
    }

    /// Append `child` (or a default element) to the XML and its node last
    /// among the element rows
    pub fn add_child_element(&mut self, element: NodeId, child: Option<Element>) -> Option<NodeId> {
        let id = self.element_of(element)?;
        let container = self.children_container(element)?;
        let child = child.unwrap_or_else(|| Element::new(self.config.new_element_tag.as_str()));

        let child_id = self.doc.import(child);
        if !self.doc.append(id, child_id) {
            self.doc.remove(child_id);
            return None;
        }
        let node = match self.build_element_node(child_id) {
            Ok(node) => node,
            Err(err) => {
                debug!(%err, "dropping element without nodes");
                self.doc.remove(child_id);
                return None;
            }
        };
        self.push_child(container, node);
        Some(node)
    }

    /// Remove the element row at `position` of a children container,
    /// together with its XML element and both subtrees
    pub fn remove_child_element(&mut self, container: NodeId, position: usize) -> bool {
        if self.children_owner(container).is_none() {
            return false;
        }
        let Some(child) = self.child_at(container, position) else {
            return false;
        };
        let Some(id) = self.element_of(child) else {
            return false;
        };
        self.doc.remove(id);
        self.detach(child);
        self.discard(child);
        true
    }

    /// Insert a detached element node at `row` of a children container and
    /// its XML element at the matching position
    pub(crate) fn insert_element_node(&mut self, container: NodeId, row: usize, node: NodeId) -> bool {
        let Some(owner) = self.children_owner(container).and_then(|o| self.element_of(o)) else {
            return false;
        };
        let Some(id) = self.element_of(node) else {
            return false;
        };
        let offset = self.element_row_offset(container);
        if row < offset || row > self.child_count(container) || self.parent(node).is_some() {
            return false;
        }
        self.doc.insert(owner, row - offset, id) && self.attach(container, row, node)
    }

    pub fn plan_insert_rows(&self, container: NodeId, position: usize, count: usize) -> Option<Change> {
        self.children_owner(container)?;
        let offset = self.element_row_offset(container);
        if count == 0 || count > self.config().max_insert_rows {
            return None;
        }
        if position < offset || position > self.child_count(container) {
            return None;
        }
        let last = position.checked_add(count - 1)?;
        Some(Change::insert(container, position, last))
    }

    pub fn plan_remove_rows(&self, container: NodeId, position: usize, count: usize) -> Option<Change> {
        let last = position.checked_add(count.checked_sub(1)?)?;
        let rows = self.children(container).get(position..=last)?;
        let in_children = self.children_owner(container).is_some();
        let removable = rows.iter().all(|&row| match self.kind(row) {
            Some(NodeKind::Element(_)) => in_children,
            Some(NodeKind::Attribute { .. }) => true,
            _ => false,
        });
        removable.then_some(Change::remove(container, position, last))
    }

    /// Remove one element or attribute row
    pub fn remove_row(&mut self, container: NodeId, position: usize) -> bool {
        let Some(child) = self.child_at(container, position) else {
            return false;
        };
        match self.kind(child).cloned() {
            Some(NodeKind::Element(_)) => self.remove_child_element(container, position),
            Some(NodeKind::Attribute { key }) => self
                .enclosing_element(child)
                .is_some_and(|owner| self.remove_attribute(owner, &key)),
            _ => false,
        }
    }

    /// Change removing the element row of `element` from its container,
    /// unless `element` is the document root
    pub fn plan_remove_element(&self, element: NodeId) -> Option<Change> {
        let container = self.parent(element)?;
        if container == self.root || !self.kind(element)?.is_element() {
            return None;
        }
        let row = self.row_in_parent(element)?;
        Some(Change::remove(container, row, row))
    }

    /// Detach the element children of `element` from both trees, keeping
    /// them alive for reinsertion elsewhere
    pub(crate) fn take_element_children(&mut self, element: NodeId) -> Vec<NodeId> {
        let children = self.element_children(element);
        for &child in &children {
            if let Some(id) = self.element_of(child) {
                self.doc.detach(id);
            }
            self.detach(child);
        }
        children
    }

    /// Detach `target` from both trees and put `wrapper`'s element in the
    /// XML slot it occupied, with `target` as its only child element
    pub(crate) fn splice_wrapper(&mut self, target: NodeId, wrapper: NodeId) -> bool {
        let (Some(target_id), Some(wrapper_id)) = (self.element_of(target), self.element_of(wrapper)) else {
            return false;
        };
        let Some(parent_id) = self.doc.parent(target_id) else {
            return false;
        };
        let Some(slot) = self.doc.position(parent_id, target_id) else {
            return false;
        };
        if self.doc.replace(parent_id, slot, wrapper_id).is_none() {
            return false;
        }
        self.detach(target);
        self.doc.append(wrapper_id, target_id)
    }

    /// Free a detached element node along with its XML element
    pub(crate) fn drop_detached(&mut self, node: NodeId) {
        if self.parent(node).is_some() {
            return;
        }
        if let Some(id) = self.element_of(node) {
            self.doc.remove(id);
        }
        self.discard(node);
    }

    /// Attach `wrapper` at `row` of `container` and `target` as its last
    /// element row. The XML must already be spliced.
    pub(crate) fn place_wrapper(&mut self, container: NodeId, row: usize, wrapper: NodeId, target: NodeId) -> bool {
        let Some(inner) = self.children_container(wrapper) else {
            return false;
        };
        self.attach(container, row, wrapper) && self.push_child(inner, target)
    }

    /// Make a new element with `tag` the document root, with the old root
    /// as its only child
    pub fn wrap_root(&mut self, tag: &str) -> bool {
        let Some(target) = self.child_at(self.root, 0) else {
            return false;
        };
        let Some(target_id) = self.element_of(target) else {
            return false;
        };
        let Some(wrapper) = self.new_element_node(Element::new(tag)) else {
            return false;
        };
        let Some(wrapper_id) = self.element_of(wrapper) else {
            return false;
        };

        self.doc.take_root();
        self.doc.append(wrapper_id, target_id);
        self.doc.set_root(wrapper_id);

        let root = self.root;
        self.detach(target);
        self.attach(root, 0, wrapper);
        match self.children_container(wrapper) {
            Some(inner) => self.push_child(inner, target),
            None => false,
        }
    }
}
