//! Arena-backed XML document with element identity

use indexmap::IndexMap;

use crate::xml::element::Element;

/// Handle to an element in a [`Document`]
///
/// Handles are never reused within one document, so a handle to a removed
/// element stays dead instead of aliasing a newer one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Clone, Debug)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    tail: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// XML element tree stored in an arena
///
/// Removed elements leave empty slots, so handles stay unique for the life
/// of the document.
#[derive(Clone, Debug, Default)]
pub struct Document {
    slots: Vec<Option<ElementData>>,
    root: Option<ElementId>,
    live: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document whose root is `root`
    pub fn from_element(root: Element) -> Self {
        let mut doc = Self::new();
        let id = doc.import(root);
        doc.root = Some(id);
        doc
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Make a detached element the document root. The previous root subtree
    /// is freed.
    pub fn set_root(&mut self, id: ElementId) -> bool {
        if !self.contains(id) || self.parent(id).is_some() {
            return false;
        }
        if let Some(old) = self.root.replace(id) {
            if old != id {
                self.free(old);
            }
        }
        true
    }

    /// Stop treating the current root as the root, leaving it detached and alive
    pub fn take_root(&mut self) -> Option<ElementId> {
        self.root.take()
    }

    /// Number of live elements, detached ones included
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.slot(id).is_some()
    }

    /// Create a detached, empty element
    pub fn create(&mut self, tag: impl Into<String>) -> ElementId {
        self.alloc(ElementData {
            tag: tag.into(),
            attributes: IndexMap::new(),
            text: None,
            tail: None,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Copy an owned element subtree into the arena, detached
    pub fn import(&mut self, element: Element) -> ElementId {
        let Element {
            tag,
            attributes,
            text,
            tail,
            children,
        } = element;
        let id = self.alloc(ElementData {
            tag,
            attributes,
            text,
            tail,
            parent: None,
            children: Vec::with_capacity(children.len()),
        });
        for child in children {
            let child_id = self.import(child);
            self.append(id, child_id);
        }
        id
    }

    /// Copy a subtree out of the arena
    pub fn export(&self, id: ElementId) -> Option<Element> {
        let data = self.slot(id)?;
        Some(Element {
            tag: data.tag.clone(),
            attributes: data.attributes.clone(),
            text: data.text.clone(),
            tail: data.tail.clone(),
            children: data
                .children
                .iter()
                .filter_map(|&child| self.export(child))
                .collect(),
        })
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.slot(id).map(|data| data.tag.as_str())
    }

    pub fn set_tag(&mut self, id: ElementId, tag: impl Into<String>) -> bool {
        match self.slot_mut(id) {
            Some(data) => {
                data.tag = tag.into();
                true
            }
            None => false,
        }
    }

    pub fn attributes(&self, id: ElementId) -> Option<&IndexMap<String, String>> {
        self.slot(id).map(|data| &data.attributes)
    }

    pub fn attributes_mut(&mut self, id: ElementId) -> Option<&mut IndexMap<String, String>> {
        self.slot_mut(id).map(|data| &mut data.attributes)
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.slot(id).and_then(|data| data.text.as_deref())
    }

    pub fn set_text(&mut self, id: ElementId, text: Option<String>) -> bool {
        match self.slot_mut(id) {
            Some(data) => {
                data.text = text;
                true
            }
            None => false,
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.slot(id).map_or(&[], |data| data.children.as_slice())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.slot(id).and_then(|data| data.parent)
    }

    /// Position of `child` in `parent`'s child list, by identity
    pub fn position(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn append(&mut self, parent: ElementId, child: ElementId) -> bool {
        let len = self.children(parent).len();
        self.insert(parent, len, child)
    }

    /// Insert a detached element at `index` among `parent`'s children
    pub fn insert(&mut self, parent: ElementId, index: usize, child: ElementId) -> bool {
        if parent == child
            || !self.contains(child)
            || self.parent(child).is_some()
            || self.root == Some(child)
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        let Some(data) = self.slot_mut(parent) else {
            return false;
        };
        if index > data.children.len() {
            return false;
        }
        data.children.insert(index, child);
        if let Some(child_data) = self.slot_mut(child) {
            child_data.parent = Some(parent);
        }
        true
    }

    /// Unlink `child` from its parent, keeping the subtree alive
    pub fn detach(&mut self, child: ElementId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        if let Some(data) = self.slot_mut(parent) {
            data.children.retain(|&c| c != child);
        }
        if let Some(data) = self.slot_mut(child) {
            data.parent = None;
        }
        true
    }

    /// Put a detached `new` in the slot at `index`, detaching and returning
    /// the element that was there.
    pub fn replace(&mut self, parent: ElementId, index: usize, new: ElementId) -> Option<ElementId> {
        let old = self.children(parent).get(index).copied()?;
        if !self.contains(new) || self.parent(new).is_some() || self.is_ancestor(new, parent) {
            return None;
        }
        self.detach(old);
        self.insert(parent, index, new).then_some(old)
    }

    /// Detach and free a whole subtree
    pub fn remove(&mut self, id: ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }
        self.free(id);
        true
    }

    fn is_ancestor(&self, candidate: ElementId, mut of: ElementId) -> bool {
        while let Some(parent) = self.parent(of) {
            if parent == candidate {
                return true;
            }
            of = parent;
        }
        false
    }

    fn free(&mut self, id: ElementId) {
        let children = self
            .slot_mut(id)
            .map(|data| std::mem::take(&mut data.children))
            .unwrap_or_default();
        for child in children {
            self.free(child);
        }
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.live -= 1;
            }
        }
    }

    fn alloc(&mut self, data: ElementData) -> ElementId {
        let id = ElementId(self.slots.len());
        self.slots.push(Some(data));
        self.live += 1;
        id
    }

    fn slot(&self, id: ElementId) -> Option<&ElementData> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut root = Element::new("root").with_attribute("id", "1");
        root.sub_element("a").sub_element("a1");
        root.sub_element("b");
        Document::from_element(root)
    }

    #[test]
    fn test_import_export_roundtrip() {
        let mut root = Element::new("root").with_text("t");
        root.sub_element("a").tail = Some("tail".to_string());
        let doc = Document::from_element(root.clone());
        let exported = doc.root().and_then(|id| doc.export(id));
        assert_eq!(exported, Some(root));
    }

    #[test]
    fn test_structure() {
        let doc = sample();
        let Some(root) = doc.root() else {
            panic!("document has a root");
        };
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.children(root).len(), 2);
        let a = doc.children(root)[0];
        assert_eq!(doc.tag(a), Some("a"));
        assert_eq!(doc.parent(a), Some(root));
        assert_eq!(doc.position(root, a), Some(0));
        assert_eq!(doc.children(a).len(), 1);
    }

    #[test]
    fn test_insert_rejects_attached_and_cycles() {
        let mut doc = sample();
        let Some(root) = doc.root() else {
            panic!("document has a root");
        };
        let a = doc.children(root)[0];
        let a1 = doc.children(a)[0];
        assert!(!doc.insert(root, 0, a), "already attached");
        assert!(doc.detach(a));
        assert!(!doc.insert(a1, 0, a), "would create a cycle");
        assert!(!doc.insert(root, 5, a), "out of range");
        assert!(doc.insert(root, 1, a));
        assert_eq!(doc.position(root, a), Some(1));
    }

    #[test]
    fn test_replace_detaches_old() {
        let mut doc = sample();
        let Some(root) = doc.root() else {
            panic!("document has a root");
        };
        let a = doc.children(root)[0];
        let wrapper = doc.create("wrap");
        assert_eq!(doc.replace(root, 0, wrapper), Some(a));
        assert_eq!(doc.parent(a), None);
        assert!(doc.append(wrapper, a));
        assert_eq!(doc.children(root)[0], wrapper);
        assert_eq!(doc.children(wrapper), &[a]);
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut doc = sample();
        let Some(root) = doc.root() else {
            panic!("document has a root");
        };
        let a = doc.children(root)[0];
        let a1 = doc.children(a)[0];
        assert!(doc.remove(a));
        assert!(!doc.contains(a));
        assert!(!doc.contains(a1));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.children(root).len(), 1);
    }

    #[test]
    fn test_set_root_frees_previous() {
        let mut doc = sample();
        let new_root = doc.create("other");
        assert!(doc.set_root(new_root));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.root(), Some(new_root));
    }
}
