// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parsing via html5ever

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcData, RcDom};

use super::{Document, NodeData, NodeId};

/// Parse HTML text into an owned [`Document`]
///
/// html5ever recovers from malformed markup the way browsers do, so this
/// never fails; garbage input produces a tree with whatever could be
/// salvaged.
pub fn parse_html(html: &str) -> Document {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

    let mut nodes = vec![NodeData::Element {
        name: "#document".to_string(),
        attrs: Vec::new(),
        children: Vec::new(),
    }];
    flatten_children(&dom.document, 0, &mut nodes);

    Document { nodes }
}

// The rcdom is Rc-based and not Send; it only lives for the duration of the
// parse and is flattened into the arena here.
fn flatten_children(handle: &Handle, parent: NodeId, nodes: &mut Vec<NodeData>) {
    for child in handle.children.borrow().iter() {
        match child.data {
            RcData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let id = nodes.len();
                nodes.push(NodeData::Element {
                    name: name.local.to_string(),
                    attrs: attrs
                        .borrow()
                        .iter()
                        .map(|a| (a.name.local.to_string(), a.value.to_string()))
                        .collect(),
                    children: Vec::new(),
                });
                if let NodeData::Element {
                    ref mut children, ..
                } = nodes[parent]
                {
                    children.push(id);
                }
                flatten_children(child, id, nodes);
            }
            RcData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                let id = nodes.len();
                nodes.push(NodeData::Text(text));
                if let NodeData::Element {
                    ref mut children, ..
                } = nodes[parent]
                {
                    children.push(id);
                }
            }
            // Comments, doctype, and processing instructions carry nothing
            // the navigation model needs.
            _ => {}
        }
    }
}
