//! Structural element handlers.
//!
//! These handlers change the shape of the tree: removing subtrees,
//! replacing an element by its children, or renaming it.

use crate::copy::{copy, ApplyFn};
use crate::error::Result;
use crate::node::{Fragment, Node};
use crate::registry::handler::TemplateHandler;

/// How [`PruneHandler`] replaces the matched node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneMode {
    /// Replace with an empty text node; child count is preserved.
    #[default]
    EmptyText,
    /// Remove the node from its parent's children entirely.
    Remove,
}

/// Handler dropping the matched node and everything below it.
///
/// It never calls `apply`, so the subtree is not visited at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneHandler {
    mode: PruneMode,
}

impl PruneHandler {
    #[must_use]
    pub fn new(mode: PruneMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn remove() -> Self {
        Self::new(PruneMode::Remove)
    }
}

impl TemplateHandler for PruneHandler {
    fn handle(&self, _node: &Node, _apply: &ApplyFn<'_>) -> Result<Fragment> {
        Ok(match self.mode {
            PruneMode::EmptyText => Fragment::Single(Node::text("")),
            PruneMode::Remove => Fragment::Sequence(Vec::new()),
        })
    }
}

/// Handler replacing an element by its transformed children.
///
/// The result is a sequence, which the engine splices into the parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnwrapHandler;

impl TemplateHandler for UnwrapHandler {
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        match node.as_element() {
            Some(element) => {
                let children = apply(Fragment::Sequence(element.children().to_vec()))?;
                Ok(Fragment::Sequence(children.into_nodes()))
            }
            None => copy(node, apply),
        }
    }
}

/// Handler copying an element under a different tag name.
#[derive(Debug, Clone)]
pub struct RenameHandler {
    tag: String,
}

impl RenameHandler {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl TemplateHandler for RenameHandler {
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        let copied = copy(node, apply)?;
        Ok(match copied {
            Fragment::Single(Node::Element(element)) => {
                Fragment::Single(Node::from(element.renamed(self.tag.as_str())))
            }
            other => other,
        })
    }
}
