use super::kind::{Group, NodeKind};
use super::tree::{Hierarchy, NodeId};
use crate::config::Layout;
use crate::error::{Error, ErrorKind, Result};
use crate::xml::ElementId;

fn inconsistent(detail: impl Into<String>) -> Error {
    Error::detached(ErrorKind::Inconsistent {
        detail: detail.into(),
    })
}

impl Hierarchy {
    /// Check that the nodes mirror the document exactly
    ///
    /// Walks both trees from the top and fails on the first mismatch: a wrong
    /// parent link, rows out of layout order, attribute rows that disagree
    /// with the attribute map, or child rows that disagree with the XML
    /// children. Unreachable live nodes or elements are reported too.
    pub fn validate(&self) -> Result<()> {
        let root = self.root;
        if !matches!(self.kind(root), Some(NodeKind::Root)) || self.parent(root).is_some() {
            return Err(inconsistent("root sentinel is malformed"));
        }

        let mut nodes = 1;
        let mut elements = 0;
        match (self.children(root), self.doc.root()) {
            ([], None) => {}
            ([node], Some(element)) => {
                self.check_link(root, *node)?;
                if self.element_of(*node) != Some(element) {
                    return Err(inconsistent("root node does not wrap the document root"));
                }
                self.check_element(*node, element, &mut nodes, &mut elements)?;
            }
            _ => return Err(inconsistent("root sentinel must hold the document root only")),
        }

        if nodes != self.node_count() {
            return Err(inconsistent(format!(
                "{} live nodes, {nodes} reachable",
                self.node_count()
            )));
        }
        if elements != self.doc.len() {
            return Err(inconsistent(format!(
                "{} live elements, {elements} reachable",
                self.doc.len()
            )));
        }
        Ok(())
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) == Some(parent) {
            Ok(())
        } else {
            Err(inconsistent(format!("{child:?} does not point back to {parent:?}")))
        }
    }

    fn check_element(
        &self,
        node: NodeId,
        element: ElementId,
        nodes: &mut usize,
        elements: &mut usize,
    ) -> Result<()> {
        *nodes += 1;
        *elements += 1;
        let keys: Vec<&String> = self
            .doc
            .attributes(element)
            .map(|attributes| attributes.keys().collect())
            .unwrap_or_default();
        let xml_children = self.doc.children(element);
        let rows = match self.layout() {
            Layout::Flat => self.children(node).to_vec(),
            Layout::Grouped => {
                let headers = self.children(node);
                if headers.len() != Group::ALL.len() {
                    return Err(inconsistent(format!("{node:?} needs three headers")));
                }
                let mut rows = Vec::new();
                for (&header, group) in headers.iter().zip(Group::ALL) {
                    self.check_link(node, header)?;
                    if self.kind(header) != Some(&NodeKind::Header(group)) {
                        return Err(inconsistent(format!("{header:?} is not {group:?}")));
                    }
                    let expected = match group {
                        Group::Attributes => keys.len(),
                        Group::Text => 1,
                        Group::Children => xml_children.len(),
                    };
                    if self.child_count(header) != expected {
                        return Err(inconsistent(format!("{header:?} has wrong row count")));
                    }
                    *nodes += 1;
                    rows.extend_from_slice(self.children(header));
                }
                rows
            }
        };

        if rows.len() != keys.len() + 1 + xml_children.len() {
            return Err(inconsistent(format!("{node:?} has {} rows", rows.len())));
        }

        let (attribute_rows, rest) = rows.split_at(keys.len());
        let (text_row, child_rows) = rest.split_at(1);
        for (&row, key) in attribute_rows.iter().zip(keys) {
            match self.kind(row) {
                Some(NodeKind::Attribute { key: k }) if k == key => {}
                _ => return Err(inconsistent(format!("{row:?} is not attribute {key}"))),
            }
        }
        if text_row
            .iter()
            .any(|&row| self.kind(row) != Some(&NodeKind::Text))
        {
            return Err(inconsistent(format!("{node:?} has no text row")));
        }

        for &row in attribute_rows.iter().chain(text_row) {
            self.check_owner(node, row)?;
            if !self.children(row).is_empty() {
                return Err(inconsistent(format!("{row:?} must be a leaf")));
            }
            *nodes += 1;
        }
        for (&row, &child) in child_rows.iter().zip(xml_children) {
            self.check_owner(node, row)?;
            if self.element_of(row) != Some(child) {
                return Err(inconsistent(format!("{row:?} does not wrap {child:?}")));
            }
            if self.doc.parent(child) != Some(element) {
                return Err(inconsistent(format!("{child:?} has a stale parent")));
            }
            self.check_element(row, child, nodes, elements)?;
        }
        Ok(())
    }

    /// `row` must hang directly off `node` or off one of its headers
    fn check_owner(&self, node: NodeId, row: NodeId) -> Result<()> {
        let Some(parent) = self.parent(row) else {
            return Err(inconsistent(format!("{row:?} is detached")));
        };
        if parent != node && self.parent(parent) != Some(node) {
            return Err(inconsistent(format!("{row:?} is under {parent:?}")));
        }
        let listed = self.children(parent).contains(&row);
        if listed {
            Ok(())
        } else {
            Err(inconsistent(format!("{parent:?} does not list {row:?}")))
        }
    }
}
