//! Attribute handlers.
//!
//! These handlers rewrite Attributes nodes. Register them under an
//! attribute predicate such as `Predicate::has_attribute("href")`; on any
//! other node they fall back to a plain copy.

use regex::Regex;
use std::sync::LazyLock;

use crate::copy::{copy, ApplyFn};
use crate::error::Result;
use crate::node::{Attributes, Fragment, Node};
use crate::registry::handler::TemplateHandler;

#[allow(clippy::expect_used)]
/// Regex matching an insecure scheme at the start of a URL.
static HTTP_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://").expect("valid regex"));

/// Attribute names rewritten by [`SecureLinkHandler::default`].
pub const DEFAULT_LINK_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Rewrite a leading `http://` to `https://`. Other values are unchanged.
///
/// # Examples
/// ```
/// use regelrecht_transform::registry::handlers::secure_url;
///
/// assert_eq!(secure_url("http://x"), "https://x");
/// assert_eq!(secure_url("https://x"), "https://x");
/// assert_eq!(secure_url("mailto:http://x"), "mailto:http://x");
/// ```
pub fn secure_url(value: &str) -> String {
    HTTP_SCHEME.replace(value, "https://").into_owned()
}

/// Handler upgrading link attributes from `http://` to `https://`.
#[derive(Debug, Clone)]
pub struct SecureLinkHandler {
    attributes: Vec<String>,
}

impl SecureLinkHandler {
    /// Rewrite only the given attribute names.
    #[must_use]
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }
}

impl Default for SecureLinkHandler {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_ATTRIBUTES)
    }
}

impl TemplateHandler for SecureLinkHandler {
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        let Some(attributes) = node.as_attributes() else {
            return copy(node, apply);
        };

        let insecure: Vec<&String> = self
            .attributes
            .iter()
            .filter(|name| attributes.get(name).is_some_and(|v| HTTP_SCHEME.is_match(v)))
            .collect();
        if insecure.is_empty() {
            return Ok(Fragment::Single(node.clone()));
        }

        let mut rewritten = attributes.clone();
        for name in insecure {
            if let Some(value) = attributes.get(name) {
                tracing::trace!(attribute = %name, value, "Upgrading link to https");
                rewritten.insert(name.as_str(), secure_url(value));
            }
        }
        Ok(Fragment::Single(Node::attributes(rewritten)))
    }
}

/// Handler setting a fixed attribute value on Attributes nodes.
#[derive(Debug, Clone)]
pub struct SetAttributeHandler {
    name: String,
    value: String,
}

impl SetAttributeHandler {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl TemplateHandler for SetAttributeHandler {
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        match node.as_attributes() {
            Some(attributes) => {
                let updated: Attributes = attributes
                    .clone()
                    .with(self.name.as_str(), self.value.as_str());
                Ok(Fragment::Single(Node::attributes(updated)))
            }
            None => copy(node, apply),
        }
    }
}
