//! Ready-made registry configurations.

use super::core::TemplateRegistry;
use super::handlers::{
    PruneHandler, PruneMode, RenameHandler, SecureLinkHandler, SetAttributeHandler, UnwrapHandler,
    DEFAULT_LINK_ATTRIBUTES,
};
use crate::error::Result;
use crate::predicate::Predicate;

/// Create a registry with no rules: every node takes the identity path.
#[must_use]
pub fn create_identity_registry() -> TemplateRegistry {
    TemplateRegistry::new()
}

/// Create a registry upgrading `href`/`src` links to https.
///
/// # Errors
/// Only fails if the built-in predicate were too deep, which it is not.
pub fn create_secure_links_registry() -> Result<TemplateRegistry> {
    let mut registry = TemplateRegistry::new();
    registry.register(
        "secure-links",
        link_attributes_predicate(),
        SecureLinkHandler::default(),
    )?;
    Ok(registry)
}

fn link_attributes_predicate() -> Predicate {
    Predicate::Or(
        DEFAULT_LINK_ATTRIBUTES
            .iter()
            .map(|name| Predicate::has_attribute(*name))
            .collect(),
    )
}

/// Set `name` to `value` on every attribute set that has `when`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAssignment {
    pub name: String,
    pub value: String,
    pub when: String,
}

/// Declarative description of a rule set, as assembled by the CLI.
///
/// Rules are registered in a fixed order: prune, unwrap, rename, attribute
/// assignments, then secure links. Within each group the given order is
/// kept, so an earlier rule shadows a later one. An attribute set matched
/// by an assignment is not also upgraded by secure links.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Tags whose subtrees are dropped.
    pub prune: Vec<String>,
    /// What a pruned subtree leaves behind.
    pub prune_mode: PruneMode,
    /// Tags replaced by their children.
    pub unwrap: Vec<String>,
    /// `(from, to)` tag renames.
    pub rename: Vec<(String, String)>,
    /// Fixed attribute values.
    pub set_attributes: Vec<AttributeAssignment>,
    /// Upgrade `href`/`src` from http to https.
    pub secure_links: bool,
}

impl RuleSet {
    /// Build the registry.
    ///
    /// # Errors
    /// Propagates registration errors.
    pub fn build(&self) -> Result<TemplateRegistry> {
        let mut registry = TemplateRegistry::new();

        for tag in &self.prune {
            registry.register(
                format!("prune:{tag}"),
                Predicate::tag(tag.as_str()),
                PruneHandler::new(self.prune_mode),
            )?;
        }
        for tag in &self.unwrap {
            registry.register(
                format!("unwrap:{tag}"),
                Predicate::tag(tag.as_str()),
                UnwrapHandler,
            )?;
        }
        for (from, to) in &self.rename {
            registry.register(
                format!("rename:{from}->{to}"),
                Predicate::tag(from.as_str()),
                RenameHandler::new(to.as_str()),
            )?;
        }
        for assignment in &self.set_attributes {
            registry.register(
                format!("set:{}@{}", assignment.name, assignment.when),
                Predicate::has_attribute(assignment.when.as_str()),
                SetAttributeHandler::new(assignment.name.as_str(), assignment.value.as_str()),
            )?;
        }
        if self.secure_links {
            registry.register(
                "secure-links",
                link_attributes_predicate(),
                SecureLinkHandler::default(),
            )?;
        }

        Ok(registry)
    }
}
