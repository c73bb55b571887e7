// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Owned HTML tree for page snapshots
//!
//! Markup is parsed once with html5ever and flattened into an immutable
//! arena. Pages never mutate their document, so the tree carries no locks
//! and stays `Send` for use across await points.

mod element;
mod parser;

pub use element::Element;
pub use parser::parse_html;

pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

/// Parsed HTML document, immutable after construction
#[derive(Debug, Clone)]
pub struct Document {
    // nodes[0] is the synthetic document root
    pub(crate) nodes: Vec<NodeData>,
}

impl Document {
    /// Create an empty document (used for non-HTML responses)
    pub fn empty() -> Self {
        Self {
            nodes: vec![NodeData::Element {
                name: "#document".to_string(),
                attrs: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    /// Get the document root
    pub fn root(&self) -> Element<'_> {
        Element { doc: self, id: 0 }
    }

    /// Find all descendant elements with the given tag name, in document order
    pub fn find_all(&self, tag: &str) -> Vec<Element<'_>> {
        self.root().find_all(tag)
    }

    /// Find the first descendant element with the given tag name
    pub fn find(&self, tag: &str) -> Option<Element<'_>> {
        self.root().find(tag)
    }

    /// Find an element by its `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<Element<'_>> {
        self.root().descendants().find(|e| e.attr("id") == Some(id))
    }

    /// Get the page title, if present
    pub fn title(&self) -> Option<String> {
        self.find("title").map(|t| t.text().trim().to_string())
    }

    /// Get the meta description, if present
    pub fn meta_description(&self) -> Option<String> {
        self.find_all("meta")
            .into_iter()
            .find(|m| m.attr("name") == Some("description"))
            .and_then(|m| m.attr("content").map(String::from))
    }

    /// Get the full text content of the document
    pub fn text(&self) -> String {
        self.root().text()
    }
}
