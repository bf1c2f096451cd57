//! Owned element tree.
//!
//! Elements produced by [`crate::parse`] remember the slice of the original
//! document they were read from. An element flagged with
//! [`Element::preserve_verbatim`] is written back as that exact slice, which
//! is how unknown content survives a decode/encode cycle byte-for-byte.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::writer;

/// Location of a parsed element inside its source document.
#[derive(Clone)]
pub(crate) struct Origin {
    pub(crate) source: Arc<str>,
    pub(crate) span: Range<usize>,
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.span.start, self.span.end)
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Returns true for text nodes holding only XML whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            Node::Text(text) => text
                .chars()
                .all(|c| matches!(c, ' ' | '\n' | '\r' | '\t')),
            Node::Element(_) => false,
        }
    }
}

/// An XML element with its attributes and children.
///
/// Equality is structural: name, attributes in order, and children. Source
/// location and the verbatim flag do not take part.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    origin: Option<Origin>,
    verbatim: bool,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.children == other.children
    }
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            origin: None,
            verbatim: false,
        }
    }

    /// Creates `<name>text</name>`.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.push_text(text);
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    pub fn has_element_children(&self) -> bool {
        self.children
            .iter()
            .any(|node| matches!(node, Node::Element(_)))
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn with_child(mut self, element: Element) -> Self {
        self.push_element(element);
        self
    }

    /// Concatenated text content of this element's direct text children.
    ///
    /// Returns `None` when the element has no text nodes at all, so an
    /// empty `<a/>` and `<a></a>` both read as `None`.
    pub fn text(&self) -> Option<String> {
        let mut out: Option<String> = None;
        for node in &self.children {
            if let Node::Text(text) = node {
                out.get_or_insert_with(String::new).push_str(text);
            }
        }
        out
    }

    /// Returns true when the element has non-whitespace text content.
    pub fn has_significant_text(&self) -> bool {
        self.children
            .iter()
            .any(|node| matches!(node, Node::Text(_)) && !node.is_whitespace())
    }

    /// The exact source text of this element, when it was parsed from a
    /// document.
    pub fn source_text(&self) -> Option<&str> {
        self.origin
            .as_ref()
            .and_then(|origin| origin.source.get(origin.span.clone()))
    }

    /// Byte range of this element in its source document.
    pub fn span(&self) -> Option<Range<usize>> {
        self.origin.as_ref().map(|origin| origin.span.clone())
    }

    /// Marks the element (and therefore its whole subtree) to be written back
    /// as its original source text. Elements built in memory have no source
    /// text and are written structurally regardless of the flag.
    pub fn preserve_verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim && self.origin.is_some()
    }

    /// Serializes this element without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        writer::element_to_string(self)
    }

    pub(crate) fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let xml = self.to_xml_string().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&xml)
    }
}

/// A parsed or constructed document fragment with a single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    root: Element,
}

impl Fragment {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parses a fragment from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        crate::reader::parse(xml)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Writes the fragment in compact form without an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        writer::element_to_string(&self.root)
    }

    /// Writes the fragment preceded by `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn to_xml_string_with_declaration(&self) -> Result<String> {
        writer::document_to_string(&self.root)
    }
}

impl std::str::FromStr for Fragment {
    type Err = crate::error::XmlError;

    fn from_str(s: &str) -> Result<Self> {
        Fragment::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_concatenates_text_nodes() {
        let mut element = Element::new("a");
        element.push_text("x");
        element.push_element(Element::new("b"));
        element.push_text("y");
        assert_eq!(element.text().as_deref(), Some("xy"));
        assert_eq!(Element::new("a").text(), None);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut element = Element::new("zone")
            .with_attribute("name", "low")
            .with_attribute("kind", "x");
        element.set_attribute("name", "high");
        assert_eq!(
            element.attributes(),
            &[
                ("name".to_string(), "high".to_string()),
                ("kind".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn test_equality_ignores_origin() {
        let parsed = Fragment::parse("<a><b>1</b></a>").unwrap();
        let built = Element::new("a").with_child(Element::leaf("b", "1"));
        assert_eq!(parsed.root(), &built);
        assert!(parsed.root().source_text().is_some());
        assert!(built.source_text().is_none());
    }

    #[test]
    fn test_verbatim_requires_origin() {
        let built = Element::new("a").preserve_verbatim();
        assert!(!built.is_verbatim());
    }
}
