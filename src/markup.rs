//! Owned SVG element trees.
//!
//! Definition markup is parsed with `roxmltree`, which only borrows its
//! input, so the tree is copied into [`Element`] values that the layout can
//! keep and write back out.

use roxmltree::{Document, Node, NodeType};
use serde::Serialize;

/// An XML element: tag, attributes in source order, and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Content>,
}

/// Child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse a single root element from markup text.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(text)?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: Node) -> Self {
        let mut el = Element::new(node.tag_name().name());
        el.attrs = node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();
        for child in node.children() {
            match child.node_type() {
                NodeType::Element => el.children.push(Content::Element(Self::from_node(child))),
                NodeType::Text => {
                    if let Some(text) = child.text() {
                        el.children.push(Content::Text(text.to_string()));
                    }
                }
                _ => {}
            }
        }
        el
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Content::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Content::Text(text.into()));
    }

    /// Serialize as compact markup; elements without children self-close.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Content::Element(el) => el.write_to(out),
                Content::Text(text) => out.push_str(&escape_text(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
