//! Rule predicates.
//!
//! Predicates are plain values rather than closures, so a registry can be
//! inspected, printed and tested without running any handler logic.
//!
//! Element, attribute and text predicates partition the node space: an
//! attribute predicate such as [`Predicate::HasAttribute`] matches the
//! Attributes node itself, never the element that carries it.

use std::fmt;

use regex::Regex;

use crate::node::Node;

/// Boolean condition over a single node.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every node.
    Any,
    /// Any element.
    Element,
    /// Element with the given tag name.
    ElementTag(String),
    /// Any attributes node.
    Attributes,
    /// Attributes node containing the given key.
    HasAttribute(String),
    /// Attributes node where `key` has exactly `value`.
    AttributeValue { key: String, value: String },
    /// Attributes node where the value of `key` matches `pattern`.
    AttributeMatches { key: String, pattern: Regex },
    /// Any text node.
    Text,
    /// Text node whose content matches the pattern.
    TextMatches(Regex),
    /// All predicates must match. Short-circuits; empty is true.
    And(Vec<Predicate>),
    /// Any predicate must match. Short-circuits; empty is false.
    Or(Vec<Predicate>),
    /// Inverts the inner predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Element with the given tag.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Predicate::ElementTag(name.into())
    }

    /// Attributes node containing `key`.
    #[must_use]
    pub fn has_attribute(key: impl Into<String>) -> Self {
        Predicate::HasAttribute(key.into())
    }

    /// Attributes node where `key` equals `value`.
    #[must_use]
    pub fn attribute_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::AttributeValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Attributes node where `key` matches `pattern`.
    #[must_use]
    pub fn attribute_matches(key: impl Into<String>, pattern: Regex) -> Self {
        Predicate::AttributeMatches {
            key: key.into(),
            pattern,
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate the predicate against a node.
    ///
    /// # Examples
    /// ```
    /// use regelrecht_transform::{Attributes, Node, Predicate};
    ///
    /// let attrs = Node::attributes(Attributes::new().with("href", "http://x"));
    /// assert!(Predicate::has_attribute("href").matches(&attrs));
    /// assert!(!Predicate::Element.matches(&attrs));
    /// ```
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Element => matches!(node, Node::Element(_)),
            Predicate::ElementTag(name) => node.as_element().is_some_and(|e| e.tag() == name),
            Predicate::Attributes => matches!(node, Node::Attributes(_)),
            Predicate::HasAttribute(key) => node.as_attributes().is_some_and(|a| a.contains_key(key)),
            Predicate::AttributeValue { key, value } => node
                .as_attributes()
                .and_then(|a| a.get(key))
                .is_some_and(|v| v == value),
            Predicate::AttributeMatches { key, pattern } => node
                .as_attributes()
                .and_then(|a| a.get(key))
                .is_some_and(|v| pattern.is_match(v)),
            Predicate::Text => matches!(node, Node::Text(_)),
            Predicate::TextMatches(pattern) => node.as_text().is_some_and(|t| pattern.is_match(t)),
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches(node)),
            Predicate::Or(predicates) => predicates.iter().any(|p| p.matches(node)),
            Predicate::Not(inner) => !inner.matches(node),
        }
    }

    /// Nesting depth; leaves are 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Predicate::And(predicates) | Predicate::Or(predicates) => {
                1 + predicates.iter().map(Predicate::depth).max().unwrap_or(0)
            }
            Predicate::Not(inner) => 1 + inner.depth(),
            _ => 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Any => f.write_str("*"),
            Predicate::Element => f.write_str("element()"),
            Predicate::ElementTag(name) => write!(f, "<{name}>"),
            Predicate::Attributes => f.write_str("attributes()"),
            Predicate::HasAttribute(key) => write!(f, "@{key}"),
            Predicate::AttributeValue { key, value } => write!(f, "@{key}='{value}'"),
            Predicate::AttributeMatches { key, pattern } => write!(f, "@{key}~/{pattern}/"),
            Predicate::Text => f.write_str("text()"),
            Predicate::TextMatches(pattern) => write!(f, "text()~/{pattern}/"),
            Predicate::And(predicates) => write_joined(f, predicates, " and ", "*"),
            Predicate::Or(predicates) => write_joined(f, predicates, " or ", "!*"),
            Predicate::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    predicates: &[Predicate],
    separator: &str,
    empty: &str,
) -> fmt::Result {
    if predicates.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{predicate}")?;
    }
    f.write_str(")")
}
