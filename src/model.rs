//! Tree model adapter
//!
//! [`EtreeModel`] answers the row/column/parent queries a tree view makes
//! and turns every structural edit of the [`Hierarchy`] into a begin/end
//! notification pair for its [`ModelObserver`].
//!
//! ```
//! use etreemodel::{EtreeModel, Recorder, Role};
//! use etreemodel::xml::Element;
//!
//! let root = Element::new("config").with_attribute("version", "1");
//! let mut model = EtreeModel::with_observer(root, Default::default(), Recorder::new());
//!
//! let element = model.root_index();
//! assert_eq!(model.data(&element, Role::Display), Some("config"));
//! assert!(model.add_child_element(&element));
//! assert!(model.observer().is_balanced());
//! ```

mod actions;
mod index;
mod observer;

use tracing::{debug, instrument};

pub use actions::Action;
pub use index::{ModelIndex, Orientation, Role};
pub use observer::{ModelObserver, Notification, Recorder};

use crate::config::{Layout, ModelConfig, ParserConfig, WriterConfig};
use crate::error::Result;
use crate::hierarchy::{Change, Hierarchy, ItemFlags, NodeId, NodeKind, COLUMN_COUNT};
use crate::xml::{Element, Parser, XmlWriter};

/// Tree model over an editable XML document
#[derive(Debug)]
pub struct EtreeModel<O: ModelObserver = ()> {
    tree: Hierarchy,
    observer: O,
}

impl EtreeModel {
    pub fn new(root: Element) -> Self {
        Self::with_config(root, ModelConfig::default())
    }

    pub fn with_config(root: Element, config: ModelConfig) -> Self {
        Self::with_observer(root, config, ())
    }

    /// Parse `input` with the default parser limits and build a model over it
    pub fn parse(input: &str, config: ModelConfig) -> Result<Self> {
        let root = Parser::with_config(input.as_bytes(), ParserConfig::default()).parse()?;
        Ok(Self::with_config(root, config))
    }
}

impl<O: ModelObserver> EtreeModel<O> {
    pub fn with_observer(root: Element, config: ModelConfig, observer: O) -> Self {
        Self {
            tree: Hierarchy::new(root, config),
            observer,
        }
    }

    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.tree
    }

    pub const fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub const fn layout(&self) -> Layout {
        self.tree.layout()
    }

    // Queries

    pub fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= COLUMN_COUNT {
            return ModelIndex::invalid();
        }
        self.resolve(parent)
            .and_then(|node| self.tree.child_at(node, row))
            .map_or_else(ModelIndex::invalid, |child| ModelIndex::new(row, column, child))
    }

    pub fn parent(&self, index: &ModelIndex) -> ModelIndex {
        index
            .node()
            .and_then(|node| self.tree.parent(node))
            .map_or_else(ModelIndex::invalid, |parent| self.index_of(parent))
    }

    pub fn row_count(&self, parent: &ModelIndex) -> usize {
        self.resolve(parent)
            .map_or(0, |node| self.tree.child_count(node))
    }

    pub const fn column_count(&self, _parent: &ModelIndex) -> usize {
        COLUMN_COUNT
    }

    pub fn data(&self, index: &ModelIndex, role: Role) -> Option<&str> {
        match role {
            Role::Display | Role::Edit => self.tree.display_value(index.node()?, index.column()),
        }
    }

    /// Header labels are empty; the view is expected to hide its header
    pub fn header_data(&self, section: usize, orientation: Orientation, role: Role) -> Option<&'static str> {
        match (orientation, role) {
            (Orientation::Horizontal, Role::Display) if section < COLUMN_COUNT => Some(""),
            _ => None,
        }
    }

    pub fn flags(&self, index: &ModelIndex) -> ItemFlags {
        index
            .node()
            .map_or(ItemFlags::empty(), |node| self.tree.flags(node, index.column()))
    }

    /// Index of the document root element, column 0
    pub fn root_index(&self) -> ModelIndex {
        self.index(0, 0, &ModelIndex::invalid())
    }

    pub fn node_kind(&self, index: &ModelIndex) -> Option<&NodeKind> {
        self.tree.kind(index.node()?)
    }

    pub fn document_root(&self) -> Option<Element> {
        let root = self.tree.document().root()?;
        self.tree.document().export(root)
    }

    pub fn to_xml_string(&self, config: &WriterConfig) -> String {
        self.document_root()
            .map(|root| XmlWriter.write(&root, config))
            .unwrap_or_default()
    }

    // Commands

    /// Write an edit to the cell at `index`, notifying on change
    #[instrument(skip(self))]
    pub fn set_data(&mut self, index: &ModelIndex, value: &str, role: Role) -> bool {
        let Some(node) = index.node() else {
            return false;
        };
        if role != Role::Edit || !self.tree.commit_edit(node, index.column(), value) {
            debug!("edit refused");
            return false;
        }
        self.observer.data_changed(index, index);
        true
    }

    /// Insert `count` placeholder elements at `position` of a children
    /// container. The XML gets the same elements at the matching position.
    ///
    /// Each placeholder goes in at `position`, so the last one created ends
    /// up first.
    #[instrument(skip(self))]
    pub fn insert_rows(&mut self, position: usize, count: usize, parent: &ModelIndex) -> bool {
        let Some(container) = self.resolve(parent) else {
            return false;
        };
        let Some(change) = self.tree.plan_insert_rows(container, position, count) else {
            debug!("not a children container or position out of range");
            return false;
        };
        self.transact(change, |tree| {
            (0..count).all(|_| {
                let tag = format!(
                    "{}{}",
                    tree.config().placeholder_prefix,
                    tree.child_count(container)
                );
                tree.new_element_node(Element::new(tag))
                    .is_some_and(|node| tree.insert_element_node(container, position, node))
            })
        })
    }

    /// Remove `count` element or attribute rows starting at `position`
    #[instrument(skip(self))]
    pub fn remove_rows(&mut self, position: usize, count: usize, parent: &ModelIndex) -> bool {
        let Some(container) = self.resolve(parent) else {
            return false;
        };
        let Some(change) = self.tree.plan_remove_rows(container, position, count) else {
            debug!("rows out of range or not removable");
            return false;
        };
        self.transact(change, |tree| {
            (0..count).all(|_| tree.remove_row(container, position))
        })
    }

    #[instrument(skip(self))]
    pub fn add_attribute(&mut self, index: &ModelIndex, key: &str, value: &str) -> bool {
        let Some(element) = self.element_at(index) else {
            return false;
        };
        let Some(change) = self.tree.plan_add_attribute(element, key) else {
            debug!("attribute key refused");
            return false;
        };
        self.transact(change, |tree| tree.add_attribute(element, key, value).is_some())
    }

    #[instrument(skip(self))]
    pub fn remove_attribute(&mut self, index: &ModelIndex, key: &str) -> bool {
        let Some(element) = self.element_at(index) else {
            return false;
        };
        let Some(change) = self.tree.plan_remove_attribute(element, key) else {
            debug!("no such attribute");
            return false;
        };
        self.transact(change, |tree| tree.remove_attribute(element, key))
    }

    #[instrument(skip(self))]
    pub fn add_child_element(&mut self, index: &ModelIndex) -> bool {
        let Some(element) = self.element_at(index) else {
            return false;
        };
        let Some(change) = self.tree.plan_add_child_element(element) else {
            return false;
        };
        self.transact(change, |tree| tree.add_child_element(element, None).is_some())
    }

    /// Wrap the element at `index` in a new element that takes its place
    ///
    /// Wrapping the document root resets the model. Anywhere else the target
    /// row is removed and the wrapper row inserted in its place, holding the
    /// target as its only child element.
    #[instrument(skip(self))]
    pub fn add_parent_element(&mut self, index: &ModelIndex) -> bool {
        let Some(target) = self.element_at(index) else {
            return false;
        };
        let tag = self.tree.config().new_element_tag.clone();
        let Some(change) = self.tree.plan_remove_element(target) else {
            return self.transact(Change::Reset, |tree| tree.wrap_root(&tag));
        };
        let Change::Remove {
            parent: container,
            first: row,
            ..
        } = change
        else {
            return false;
        };

        let Some(wrapper) = self.tree.new_element_node(Element::new(tag)) else {
            return false;
        };
        if !self.transact(change, |tree| tree.splice_wrapper(target, wrapper)) {
            debug!("wrapper not spliced into the document");
            self.tree.drop_detached(wrapper);
            return false;
        }
        self.transact(Change::insert(container, row, row), |tree| {
            tree.place_wrapper(container, row, wrapper, target)
        })
    }

    /// Remove the element at `index`, moving its child elements into its
    /// place. The document root cannot be removed.
    #[instrument(skip(self))]
    pub fn remove_element(&mut self, index: &ModelIndex) -> bool {
        let Some(element) = self.element_at(index) else {
            return false;
        };
        let Some(change) = self.tree.plan_remove_element(element) else {
            debug!("refusing to remove the document root");
            return false;
        };
        let Change::Remove {
            parent: container,
            first: row,
            ..
        } = change
        else {
            return false;
        };

        let promoted = self.transact(change, |tree| {
            let children = tree.take_element_children(element);
            tree.remove_child_element(container, row).then_some(children)
        });
        let Some(promoted) = promoted else {
            return false;
        };
        if promoted.is_empty() {
            return true;
        }

        let last = row + promoted.len() - 1;
        self.transact(Change::insert(container, row, last), |tree| {
            promoted
                .iter()
                .zip(row..)
                .all(|(&child, at)| tree.insert_element_node(container, at, child))
        })
    }

    /// Remove the element at `index` with its whole subtree. The document
    /// root cannot be deleted.
    #[instrument(skip(self))]
    pub fn delete_element(&mut self, index: &ModelIndex) -> bool {
        let Some(element) = self.element_at(index) else {
            return false;
        };
        let Some(change) = self.tree.plan_remove_element(element) else {
            debug!("refusing to delete the document root");
            return false;
        };
        let Change::Remove {
            parent: container,
            first: row,
            ..
        } = change
        else {
            return false;
        };
        self.transact(change, |tree| tree.remove_child_element(container, row))
    }

    /// Replace the whole document
    #[instrument(skip_all, fields(tag = %root.tag))]
    pub fn set_document_root(&mut self, root: Element) {
        self.transact(Change::Reset, |tree| tree.replace_document(root));
    }

    /// Rebuild every row for another layout
    #[instrument(skip(self))]
    pub fn set_layout(&mut self, layout: Layout) {
        self.transact(Change::Reset, |tree| tree.set_layout(layout));
    }

    /// Run `edit` between the begin and end notifications for `change`
    fn transact<R>(&mut self, change: Change, edit: impl FnOnce(&mut Hierarchy) -> R) -> R {
        match change {
            Change::Insert {
                parent,
                first,
                last,
            } => {
                let parent = self.index_of(parent);
                self.observer.begin_insert_rows(&parent, first, last);
                let result = edit(&mut self.tree);
                self.observer.end_insert_rows();
                result
            }
            Change::Remove {
                parent,
                first,
                last,
            } => {
                let parent = self.index_of(parent);
                self.observer.begin_remove_rows(&parent, first, last);
                let result = edit(&mut self.tree);
                self.observer.end_remove_rows();
                result
            }
            Change::Reset => {
                self.observer.begin_reset();
                let result = edit(&mut self.tree);
                self.observer.end_reset();
                result
            }
        }
    }

    /// Node an index points at, the root sentinel for the invalid index
    fn resolve(&self, index: &ModelIndex) -> Option<NodeId> {
        match index.node() {
            None => Some(self.tree.root()),
            Some(node) if self.tree.contains(node) => Some(node),
            Some(_) => None,
        }
    }

    fn element_at(&self, index: &ModelIndex) -> Option<NodeId> {
        let node = index.node()?;
        self.tree
            .kind(node)
            .is_some_and(NodeKind::is_element)
            .then_some(node)
    }

    /// Column-0 index for a live node, invalid for the root sentinel
    fn index_of(&self, node: NodeId) -> ModelIndex {
        if node == self.tree.root() {
            return ModelIndex::invalid();
        }
        self.tree
            .row_in_parent(node)
            .map_or_else(ModelIndex::invalid, |row| ModelIndex::new(row, 0, node))
    }
}
