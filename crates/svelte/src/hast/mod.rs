//! Markup tree produced from the markdown document tree.
//!
//! A small hast-like model: elements with ordered properties, text, and raw
//! markup that is emitted verbatim by the serializer.
//!
//! - `convert` - mdast to markup tree conversion
//! - `serialize` - markup tree to HTML string

mod convert;
mod serialize;

pub use convert::to_hast;
pub use serialize::to_html;

use indexmap::IndexMap;

/// Ordered element properties.
pub type Properties = IndexMap<String, PropertyValue>;

/// A property value on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Serialized as `name="value"`.
    String(String),
    /// `true` serializes as a bare attribute name, `false` is omitted.
    Bool(bool),
    /// Serialized as `name="n"`.
    Number(f64),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Document root.
    Root(Root),
    /// An element such as `<p>` or a component wrapper such as `<P>`.
    Element(Element),
    /// Text content, escaped on output.
    Text(Text),
    /// Markup emitted verbatim and never re-parsed.
    Raw(Raw),
}

/// Document root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name, case preserved.
    pub tag_name: String,
    /// Attributes in insertion order.
    pub properties: Properties,
    /// Child nodes.
    pub children: Vec<Node>,
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    /// Unescaped text.
    pub value: String,
}

/// A raw markup node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Raw {
    /// Markup emitted as-is.
    pub value: String,
}

impl Element {
    /// Creates an element without properties.
    pub fn new(tag_name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children,
        }
    }

    /// Sets a property, returning the element for chaining.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }
}

impl Node {
    /// Creates a root node.
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(Root { children })
    }

    /// Creates an element node without properties.
    pub fn element(tag_name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag_name, children))
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// Creates a raw node.
    pub fn raw(value: impl Into<String>) -> Self {
        Node::Raw(Raw {
            value: value.into(),
        })
    }

    /// Children of roots and elements.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(root) => Some(&root.children),
            Node::Element(element) => Some(&element.children),
            Node::Text(_) | Node::Raw(_) => None,
        }
    }

    /// Mutable children of roots and elements.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(root) => Some(&mut root.children),
            Node::Element(element) => Some(&mut element.children),
            Node::Text(_) | Node::Raw(_) => None,
        }
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the tag name for element nodes.
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|element| element.tag_name.as_str())
    }
}
