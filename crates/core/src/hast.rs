//! HTML-level syntax tree.
//!
//! The shape follows unified's hast so that a serialized tree can be handed
//! straight to a JavaScript renderer. Every element owns its children; there
//! are no parent pointers, so passes that need to splice a node work on the
//! parent's `children` vector.

use serde::Serialize;
use serde::ser::SerializeMap;

/// A property value: a scalar string, a space-separated token list, or a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Plain attribute value.
    String(String),
    /// Token list such as `class`.
    List(Vec<String>),
    /// Boolean attribute (`disabled`, `checked`).
    Bool(bool),
}

impl PropertyValue {
    /// Returns the scalar string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }
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

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Insertion-ordered attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Sets a property, keeping the original position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Removes a property and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterates properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Root {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Lowercase tag name.
    pub tag_name: String,
    /// Attributes in source order.
    pub properties: Properties,
    /// Child nodes.
    pub children: Vec<Node>,
}

/// A text node. The value is unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    /// Text payload.
    pub value: String,
}

/// A node of the HTML-level tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// The single document root.
    Root(Root),
    /// An element with attributes and children.
    Element(Element),
    /// Literal text.
    Text(Text),
}

impl Node {
    /// Creates a root from top-level children.
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(Root { children })
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// Child nodes, empty for text.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(root) => &root.children,
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    /// Mutable child list, `None` for text.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(root) => Some(&mut root.children),
            Node::Element(element) => Some(&mut element.children),
            Node::Text(_) => None,
        }
    }

    /// Returns the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element mutably, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

fn collect_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) => buffer.push_str(&text.value),
        _ => {
            for child in node.children() {
                collect_text(child, buffer);
            }
        }
    }
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Builder: sets a property.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(name, value);
        self
    }

    /// Builder: sets the class list.
    pub fn with_classes(self, classes: &[&str]) -> Self {
        let classes = classes.iter().map(|class| class.to_string()).collect::<Vec<_>>();
        self.with_property("class", classes)
    }

    /// Builder: appends a child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Scalar string property.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }

    /// The `id` attribute, if set and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.property_str("id").filter(|id| !id.is_empty())
    }

    /// Class tokens, accepting both list and whitespace-separated forms.
    pub fn classes(&self) -> Vec<&str> {
        match self.properties.get("class") {
            Some(PropertyValue::List(list)) => list.iter().map(String::as_str).collect(),
            Some(PropertyValue::String(value)) => value.split_whitespace().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag_name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Concatenated descendant text.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        for child in &self.children {
            collect_text(child, &mut buffer);
        }
        buffer
    }
}

/// Visits every element under `nodes` in document order.
///
/// The callback sees an element before its children, so changes it makes to
/// `children` are what the walk descends into.
pub fn visit_elements_mut<E>(
    nodes: &mut [Node],
    visit: &mut impl FnMut(&mut Element) -> Result<(), E>,
) -> Result<(), E> {
    for node in nodes {
        if let Node::Element(element) = node {
            visit(element)?;
            visit_elements_mut(&mut element.children, visit)?;
        }
    }
    Ok(())
}

/// Read-only counterpart of [`visit_elements_mut`].
pub fn visit_elements<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            visit(element);
            visit_elements(&element.children, visit);
        }
    }
}
