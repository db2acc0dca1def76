//! Template registry: ordered rules, first match wins.

use std::fmt;

use super::handler::{IdentityHandler, TemplateHandler};
use crate::config::{IDENTITY_RULE_NAME, MAX_PREDICATE_DEPTH};
use crate::error::{Result, TransformError};
use crate::node::Node;
use crate::predicate::Predicate;

static IDENTITY: IdentityHandler = IdentityHandler;

/// A predicate paired with the handler it selects.
pub struct Rule {
    name: String,
    predicate: Predicate,
    handler: Box<dyn TemplateHandler>,
}

impl Rule {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn handler(&self) -> &dyn TemplateHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("predicate", &format_args!("{}", self.predicate))
            .finish_non_exhaustive()
    }
}

/// Ordered collection of rules.
///
/// Rules are tried in registration order and the first matching predicate
/// wins. There are no priorities and no specificity scoring: to override a
/// broad rule, register the narrow one before it. When nothing matches,
/// [`IdentityHandler`] copies the node and keeps descending.
///
/// The registry is append-only; once handed to an engine it is only read.
#[derive(Default)]
pub struct TemplateRegistry {
    rules: Vec<Rule>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    ///
    /// # Errors
    /// Returns `PredicateTooDeep` if the predicate nests deeper than
    /// [`MAX_PREDICATE_DEPTH`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: Predicate,
        handler: impl TemplateHandler + 'static,
    ) -> Result<()> {
        let name = name.into();
        let depth = predicate.depth();
        if depth > MAX_PREDICATE_DEPTH {
            return Err(TransformError::PredicateTooDeep {
                rule: name,
                depth,
                max: MAX_PREDICATE_DEPTH,
            });
        }

        tracing::debug!(rule = %name, predicate = %predicate, position = self.rules.len(), "Registered template rule");
        self.rules.push(Rule {
            name,
            predicate,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Find the first rule whose predicate matches, with its position.
    #[must_use]
    pub fn find(&self, node: &Node) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.predicate.matches(node))
    }

    /// Get the handler for a node, falling back to identity copy.
    #[must_use]
    pub fn resolve(&self, node: &Node) -> &dyn TemplateHandler {
        self.resolve_named(node).1
    }

    /// Like [`resolve`](Self::resolve), also returning the rule name
    /// (`identity` for the fallback).
    #[must_use]
    pub fn resolve_named(&self, node: &Node) -> (&str, &dyn TemplateHandler) {
        match self.find(node) {
            Some((_, rule)) => (rule.name(), rule.handler()),
            None => (IDENTITY_RULE_NAME, &IDENTITY as &dyn TemplateHandler),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule names in registration order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("rules", &self.rules)
            .finish()
    }
}
