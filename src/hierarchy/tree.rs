use tracing::trace;

use super::kind::{Group, ItemFlags, NodeKind};
use crate::config::{Layout, ModelConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::xml::{is_valid_name, Document, Element, ElementId};

/// Every node has a label/key column and a value column
pub const COLUMN_COUNT: usize = 2;

const TEXT_LABEL: &str = "Text:";

/// Handle to a node in a [`Hierarchy`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
pub(super) struct NodeData {
    pub(super) kind: NodeKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

/// Arena of presentation nodes plus the XML document they mirror
///
/// Freed nodes leave empty slots behind. The arena only shrinks when it is
/// rebuilt on a reset.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    pub(super) doc: Document,
    pub(super) nodes: Vec<Option<NodeData>>,
    live: usize,
    pub(super) root: NodeId,
    pub(super) config: ModelConfig,
}

impl Hierarchy {
    pub fn new(root: Element, config: ModelConfig) -> Self {
        let mut tree = Self {
            doc: Document::from_element(root),
            nodes: Vec::new(),
            live: 0,
            root: NodeId(0),
            config,
        };
        tree.rebuild();
        tree
    }

    /// Drop every node and rebuild them from the document
    pub(crate) fn rebuild(&mut self) {
        self.nodes.clear();
        self.live = 0;
        self.root = self.alloc(NodeKind::Root);
        if let Some(element) = self.doc.root() {
            if let Ok(node) = self.build_element_node(element) {
                self.attach(self.root, 0, node);
            }
        }
        trace!(nodes = self.live, "rebuilt hierarchy");
    }

    /// Replace the document wholesale
    pub(crate) fn replace_document(&mut self, root: Element) {
        self.doc = Document::from_element(root);
        self.rebuild();
    }

    pub(crate) fn set_layout(&mut self, layout: Layout) {
        self.config.layout = layout;
        self.rebuild();
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub const fn layout(&self) -> Layout {
        self.config.layout
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    /// Number of live nodes, the root sentinel included
    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).map(|data| &data.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|data| data.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map_or(&[], |data| data.children.as_slice())
    }

    pub fn child_at(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.children(id).get(row).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Position among the parent's children, recomputed on every call
    pub fn row_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// XML element wrapped by an element node
    pub fn element_of(&self, id: NodeId) -> Option<ElementId> {
        self.kind(id).and_then(NodeKind::element)
    }

    /// Nearest element node strictly above `id`
    pub fn enclosing_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id)?;
        loop {
            if self.kind(current)?.is_element() {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    /// Insert a detached node into a root or element node. Only the node
    /// structure changes; the XML document is left alone.
    pub fn insert_child(&mut self, parent: NodeId, position: usize, child: NodeId) -> bool {
        let accepts = self.kind(parent).is_some_and(NodeKind::accepts_children);
        if !accepts
            || position > self.child_count(parent)
            || !self.contains(child)
            || self.parent(child).is_some()
            || child == self.root
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        self.attach(parent, position, child)
    }

    /// Detach the child at `position` from a root or element node. The
    /// detached subtree stays allocated and can be inserted again.
    pub fn remove_child(&mut self, parent: NodeId, position: usize) -> bool {
        let accepts = self.kind(parent).is_some_and(NodeKind::accepts_children);
        match self.child_at(parent, position) {
            Some(child) if accepts => self.detach(child).is_some(),
            _ => false,
        }
    }

    pub fn display_value(&self, id: NodeId, column: usize) -> Option<&str> {
        match (self.kind(id)?, column) {
            (NodeKind::Element(element), 0) => self.doc.tag(*element),
            (NodeKind::Attribute { key }, 0) => Some(key.as_str()),
            (NodeKind::Attribute { key }, 1) => {
                let owner = self.owner_element(id)?;
                self.doc.attributes(owner)?.get(key).map(String::as_str)
            }
            (NodeKind::Text, 0) => (self.layout() == Layout::Flat).then_some(TEXT_LABEL),
            (NodeKind::Text, 1) => self.doc.text(self.owner_element(id)?),
            (NodeKind::Header(group), 0) => Some(group.label()),
            _ => None,
        }
    }

    /// Write an edit to the XML. Returns `false` when nothing changed.
    pub fn commit_edit(&mut self, id: NodeId, column: usize, value: &str) -> bool {
        let Some(kind) = self.kind(id).cloned() else {
            return false;
        };
        match (kind, column) {
            (NodeKind::Element(element), 0) => {
                if !is_valid_name(value) || self.doc.tag(element) == Some(value) {
                    return false;
                }
                self.doc.set_tag(element, value)
            }
            (NodeKind::Attribute { key }, 0) => self.rename_attribute(id, &key, value),
            (NodeKind::Attribute { key }, 1) => {
                let Some(owner) = self.owner_element(id) else {
                    return false;
                };
                match self
                    .doc
                    .attributes_mut(owner)
                    .and_then(|attributes| attributes.get_mut(&key))
                {
                    Some(current) if current.as_str() != value => {
                        *current = value.to_string();
                        true
                    }
                    _ => false,
                }
            }
            (NodeKind::Text, 1) => {
                let Some(owner) = self.owner_element(id) else {
                    return false;
                };
                if self.doc.text(owner).unwrap_or_default() == value {
                    return false;
                }
                let text = (!value.is_empty()).then(|| value.to_string());
                self.doc.set_text(owner, text)
            }
            _ => false,
        }
    }

    pub fn flags(&self, id: NodeId, column: usize) -> ItemFlags {
        match self.kind(id) {
            Some(kind) if column < COLUMN_COUNT => kind.flags(column),
            _ => ItemFlags::empty(),
        }
    }

    /// The new key is written before the old one is dropped, at the same
    /// position in the attribute map.
    fn rename_attribute(&mut self, id: NodeId, old: &str, new: &str) -> bool {
        if old == new || !is_valid_name(new) {
            return false;
        }
        let Some(owner) = self.owner_element(id) else {
            return false;
        };
        let Some(attributes) = self.doc.attributes_mut(owner) else {
            return false;
        };
        if attributes.contains_key(new) {
            return false;
        }
        let Some((index, _, value)) = attributes.get_full(old) else {
            return false;
        };
        let value = value.clone();
        attributes.insert(new.to_string(), value);
        attributes.move_index(attributes.len().saturating_sub(1), index);
        attributes.shift_remove_index(index + 1);

        if let Some(NodeData {
            kind: NodeKind::Attribute { key },
            ..
        }) = self.data_mut(id)
        {
            *key = new.to_string();
        }
        true
    }

    /// Element whose attribute or text an attribute/text node shows
    pub(super) fn owner_element(&self, id: NodeId) -> Option<ElementId> {
        self.enclosing_element(id)
            .and_then(|node| self.element_of(node))
    }

    /// Create the node subtree for a live XML element, detached
    pub(crate) fn build_element_node(&mut self, element: ElementId) -> Result<NodeId> {
        if !self.doc.contains(element) {
            return Err(Error::detached(ErrorKind::NotAnElement));
        }
        let keys: Vec<String> = self
            .doc
            .attributes(element)
            .map(|attributes| attributes.keys().cloned().collect())
            .unwrap_or_default();
        let children = self.doc.children(element).to_vec();

        let node = self.alloc(NodeKind::Element(element));
        let (attribute_parent, text_parent, child_parent) = match self.layout() {
            Layout::Flat => (node, node, node),
            Layout::Grouped => {
                let [attributes, text, elements] = Group::ALL.map(|group| {
                    let header = self.alloc(NodeKind::Header(group));
                    self.push_child(node, header);
                    header
                });
                (attributes, text, elements)
            }
        };

        for key in keys {
            let attribute = self.alloc(NodeKind::Attribute { key });
            self.push_child(attribute_parent, attribute);
        }
        let text = self.alloc(NodeKind::Text);
        self.push_child(text_parent, text);
        for child in children {
            let child_node = self.build_element_node(child)?;
            self.push_child(child_parent, child_node);
        }
        Ok(node)
    }

    /// Import an owned element into the document and build its nodes, both
    /// detached
    pub(crate) fn new_element_node(&mut self, element: Element) -> Option<NodeId> {
        let id = self.doc.import(element);
        self.build_element_node(id).ok()
    }

    pub(super) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.live += 1;
        self.nodes.push(Some(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    /// Link `child` under `parent` at `position`, without capability checks
    pub(crate) fn attach(&mut self, parent: NodeId, position: usize, child: NodeId) -> bool {
        match self.data_mut(parent) {
            Some(data) if position <= data.children.len() => {
                data.children.insert(position, child);
            }
            _ => return false,
        }
        if let Some(data) = self.data_mut(child) {
            data.parent = Some(parent);
        }
        true
    }

    pub(super) fn push_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let position = self.child_count(parent);
        self.attach(parent, position, child)
    }

    /// Unlink a node from its parent, returning where it was
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let row = self.row_in_parent(id)?;
        if let Some(data) = self.data_mut(parent) {
            data.children.remove(row);
        }
        if let Some(data) = self.data_mut(id) {
            data.parent = None;
        }
        Some((parent, row))
    }

    /// Free a detached node subtree. The XML is not touched.
    pub(super) fn discard(&mut self, id: NodeId) {
        let children = self
            .data_mut(id)
            .map(|data| std::mem::take(&mut data.children))
            .unwrap_or_default();
        for child in children {
            self.discard(child);
        }
        if let Some(slot) = self.nodes.get_mut(id.0) {
            if slot.take().is_some() {
                self.live -= 1;
            }
        }
    }

    fn is_ancestor(&self, candidate: NodeId, mut of: NodeId) -> bool {
        if candidate == of {
            return true;
        }
        while let Some(parent) = self.parent(of) {
            if parent == candidate {
                return true;
            }
            of = parent;
        }
        false
    }

    pub(super) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(super) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(layout: Layout) -> Hierarchy {
        let mut root = Element::new("xmlRoot")
            .with_attribute("attrib1", "foo")
            .with_text("hello");
        root.sub_element("Child1").sub_element("SubChild1");
        root.sub_element("Child2");
        Hierarchy::new(root, ModelConfig::default().with_layout(layout))
    }

    fn root_element(tree: &Hierarchy) -> NodeId {
        match tree.child_at(tree.root(), 0) {
            Some(node) => node,
            None => panic!("root element node missing"),
        }
    }

    #[test]
    fn test_flat_layout_rows() {
        let tree = sample(Layout::Flat);
        let root = root_element(&tree);
        let labels: Vec<_> = tree
            .children(root)
            .iter()
            .map(|&child| tree.display_value(child, 0))
            .collect();
        assert_eq!(
            labels,
            [Some("attrib1"), Some("Text:"), Some("Child1"), Some("Child2")]
        );
        let text = tree.child_at(root, 1);
        assert_eq!(text.and_then(|t| tree.display_value(t, 1)), Some("hello"));
    }

    #[test]
    fn test_grouped_layout_rows() {
        let tree = sample(Layout::Grouped);
        let root = root_element(&tree);
        assert_eq!(tree.child_count(root), 3);
        let labels: Vec<_> = tree
            .children(root)
            .iter()
            .map(|&child| tree.display_value(child, 0))
            .collect();
        assert_eq!(labels, [Some("Attributes:"), Some("Text:"), Some("Children:")]);

        let children = tree.child_at(root, 2).map(|h| tree.child_count(h));
        assert_eq!(children, Some(2));
        let text = tree.child_at(root, 1).and_then(|h| tree.child_at(h, 0));
        assert_eq!(text.and_then(|t| tree.display_value(t, 0)), None);
        assert_eq!(text.and_then(|t| tree.display_value(t, 1)), Some("hello"));
    }

    #[test]
    fn test_row_in_parent_is_recomputed() {
        let mut tree = sample(Layout::Flat);
        let root = root_element(&tree);
        let Some(child2) = tree.child_at(root, 3) else {
            panic!("Child2 missing");
        };
        assert_eq!(tree.row_in_parent(child2), Some(3));
        assert!(tree.remove_child(root, 2));
        assert_eq!(tree.row_in_parent(child2), Some(2));
    }

    #[test]
    fn test_insert_child_bounds_and_capabilities() {
        let mut tree = sample(Layout::Flat);
        let root = root_element(&tree);
        let Some(node) = tree.new_element_node(Element::new("loose")) else {
            panic!("node not built");
        };
        let count = tree.child_count(root);
        assert!(!tree.insert_child(root, count + 1, node));
        let Some(text) = tree.child_at(root, 1) else {
            panic!("text node missing");
        };
        assert!(!tree.insert_child(text, 0, node));
        assert!(tree.insert_child(root, count, node));
        assert_eq!(tree.parent(node), Some(root));
        assert!(!tree.insert_child(root, 0, node), "already attached");
        assert!(!tree.remove_child(root, count + 1));
    }

    #[test]
    fn test_edit_tag_and_text() {
        let mut tree = sample(Layout::Flat);
        let root = root_element(&tree);
        assert!(!tree.commit_edit(root, 0, "xmlRoot"), "same tag");
        assert!(!tree.commit_edit(root, 0, "not valid"));
        assert!(!tree.commit_edit(root, 1, "x"), "value column");
        assert!(tree.commit_edit(root, 0, "renamed"));
        assert_eq!(tree.display_value(root, 0), Some("renamed"));

        let Some(text) = tree.child_at(root, 1) else {
            panic!("text node missing");
        };
        assert!(!tree.commit_edit(text, 0, "x"));
        assert!(!tree.commit_edit(text, 1, "hello"));
        assert!(tree.commit_edit(text, 1, ""));
        assert_eq!(tree.display_value(text, 1), None);
    }

    #[test]
    fn test_attribute_rename_keeps_value_and_position() {
        let root = Element::new("r")
            .with_attribute("a", "1")
            .with_attribute("b", "2")
            .with_attribute("c", "3");
        let mut tree = Hierarchy::new(root, ModelConfig::default().with_layout(Layout::Flat));
        let element = root_element(&tree);
        let Some(b) = tree.child_at(element, 1) else {
            panic!("attribute b missing");
        };

        assert!(!tree.commit_edit(b, 0, "b"), "same key");
        assert!(!tree.commit_edit(b, 0, "c"), "collides");
        assert!(tree.commit_edit(b, 0, "z"));
        assert_eq!(tree.display_value(b, 0), Some("z"));
        assert_eq!(tree.display_value(b, 1), Some("2"));
        assert_eq!(tree.row_in_parent(b), Some(1));

        let keys: Vec<_> = tree
            .element_of(element)
            .and_then(|id| tree.document().attributes(id))
            .map(|attributes| attributes.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, ["a", "z", "c"]);
    }

    #[test]
    fn test_build_from_dead_element_fails() {
        let mut tree = sample(Layout::Grouped);
        let root = root_element(&tree);
        let Some(element) = tree.element_of(root) else {
            panic!("root is an element node");
        };
        tree.doc.remove(element);
        let err = tree.build_element_node(element).map(|_| ());
        assert_eq!(
            err.map_err(|e| e.kind().clone()),
            Err(ErrorKind::NotAnElement)
        );
    }
}
