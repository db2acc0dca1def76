//! Node model for element trees.
//!
//! A tree is built from three closed variants: elements, attribute
//! mappings and text leaves. Nodes are immutable; payloads sit behind an
//! [`Arc`] so an untouched subtree is shared between the input and output
//! of a transformation instead of being deep-copied.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Classification of a node, used for diagnostics and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Element,
    Attributes,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Element => "element",
            NodeKind::Attributes => "attributes",
            NodeKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A node in an element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Tag name, attributes and ordered children.
    Element(Arc<Element>),
    /// Attribute mapping; terminal under copy.
    Attributes(Arc<Attributes>),
    /// Text leaf.
    Text(Arc<str>),
}

impl Node {
    /// Create an element node.
    ///
    /// # Examples
    /// ```
    /// use regelrecht_transform::{Attributes, Node};
    ///
    /// let link = Node::element(
    ///     "a",
    ///     Attributes::new().with("href", "http://x"),
    ///     vec![Node::text("t")],
    /// );
    /// assert_eq!(link.as_element().map(|e| e.tag()), Some("a"));
    /// ```
    #[must_use]
    pub fn element(tag: impl Into<String>, attributes: Attributes, children: Vec<Node>) -> Self {
        Node::Element(Arc::new(Element::new(tag, attributes, children)))
    }

    /// Create an attributes node.
    #[must_use]
    pub fn attributes(attributes: Attributes) -> Self {
        Node::Attributes(Arc::new(attributes))
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl AsRef<str>) -> Self {
        Node::Text(Arc::from(text.as_ref()))
    }

    /// Return the variant classification.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Attributes(_) => NodeKind::Attributes,
            Node::Text(_) => NodeKind::Text,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Attributes(attributes) => Some(attributes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Check whether two nodes share the same allocation.
    ///
    /// Structural equality is `==`; this is the cheaper identity test used
    /// to confirm a subtree was passed through rather than rebuilt.
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => Arc::ptr_eq(a, b),
            (Node::Attributes(a), Node::Attributes(b)) => Arc::ptr_eq(a, b),
            (Node::Text(a), Node::Text(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(Arc::new(element))
    }
}

impl From<Attributes> for Node {
    fn from(attributes: Attributes) -> Self {
        Node::Attributes(Arc::new(attributes))
    }
}

/// An element: tag name, attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    tag: String,
    #[serde(default, skip_serializing_if = "no_attributes")]
    attributes: Arc<Attributes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>, attributes: Attributes, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Arc::new(attributes),
            children,
        }
    }

    /// Build an element from an already shared attribute mapping.
    #[must_use]
    pub fn from_shared(tag: impl Into<String>, attributes: Arc<Attributes>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The attribute mapping wrapped as a node, sharing the allocation.
    #[must_use]
    pub fn attributes_node(&self) -> Node {
        Node::Attributes(Arc::clone(&self.attributes))
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Same attributes and children under a different tag.
    #[must_use]
    pub fn renamed(&self, tag: impl Into<String>) -> Element {
        Element {
            tag: tag.into(),
            attributes: Arc::clone(&self.attributes),
            children: self.children.clone(),
        }
    }
}

fn no_attributes(attributes: &Arc<Attributes>) -> bool {
    attributes.is_empty()
}

/// A single attribute name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Attribute mapping with unique keys and insertion order.
///
/// Inserting an existing key replaces its value in place, so output order
/// stays stable across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Attribute { name, value });
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|a| a.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|a| a.name == name)?;
        Some(self.entries.remove(index).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for attribute in &self.entries {
            map.serialize_entry(&attribute.name, &attribute.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to string values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Attributes, M::Error> {
                let mut attributes = Attributes::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    attributes.insert(name, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Input and output of template application: one node or a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Single(Node),
    Sequence(Vec<Node>),
}

impl Fragment {
    /// Flatten into a list of nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Fragment::Single(node) => vec![node],
            Fragment::Sequence(nodes) => nodes,
        }
    }

    /// Return the node if this is a single-node fragment.
    #[must_use]
    pub fn into_single(self) -> Option<Node> {
        match self {
            Fragment::Single(node) => Some(node),
            Fragment::Sequence(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Fragment::Single(_) => 1,
            Fragment::Sequence(nodes) => nodes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Fragment::Single(node)
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Fragment::Sequence(nodes)
    }
}
