// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element accessors over the document arena

use super::{Document, NodeData, NodeId};

/// A handle to one element in a parsed [`Document`]
///
/// Cheap to copy; borrows the document it came from.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) id: NodeId,
}

impl<'a> Element<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id]
    }

    /// Get the tag name (lowercase)
    pub fn name(&self) -> &'a str {
        match self.data() {
            NodeData::Element { name, .. } => name,
            NodeData::Text(_) => "",
        }
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match self.data() {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Check if the element carries an attribute
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Iterate over all attributes in markup order
    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let attrs = match self.data() {
            NodeData::Element { attrs, .. } => attrs.as_slice(),
            NodeData::Text(_) => &[],
        };
        attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Get direct element children in document order
    pub fn children(&self) -> Vec<Element<'a>> {
        match self.data() {
            NodeData::Element { children, .. } => children
                .iter()
                .filter(|&&id| matches!(self.doc.nodes[id], NodeData::Element { .. }))
                .map(|&id| Element { doc: self.doc, id })
                .collect(),
            NodeData::Text(_) => Vec::new(),
        }
    }

    /// Get the concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.doc.nodes[id] {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element { children, .. } => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Iterate over all descendant elements in document order
    pub fn descendants(&self) -> impl Iterator<Item = Element<'a>> {
        let mut ids = Vec::new();
        collect_descendants(self.doc, self.id, &mut ids);
        let doc = self.doc;
        ids.into_iter().map(move |id| Element { doc, id })
    }

    /// Find all descendant elements with the given tag name
    pub fn find_all(&self, tag: &str) -> Vec<Element<'a>> {
        self.descendants().filter(|e| e.name() == tag).collect()
    }

    /// Find all descendants matching any of the given tag names
    pub fn find_all_any(&self, tags: &[&str]) -> Vec<Element<'a>> {
        self.descendants()
            .filter(|e| tags.contains(&e.name()))
            .collect()
    }

    /// Find the first descendant element with the given tag name
    pub fn find(&self, tag: &str) -> Option<Element<'a>> {
        self.descendants().find(|e| e.name() == tag)
    }
}

fn collect_descendants(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
    if let NodeData::Element { children, .. } = &doc.nodes[id] {
        for &child in children {
            if matches!(doc.nodes[child], NodeData::Element { .. }) {
                out.push(child);
                collect_descendants(doc, child, out);
            }
        }
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}
