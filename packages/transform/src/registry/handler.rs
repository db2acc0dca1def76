//! Template handler trait definition.

use crate::copy::{copy, ApplyFn};
use crate::error::Result;
use crate::node::{Fragment, Node};

/// Trait for template handlers.
///
/// A handler rewrites the node its rule matched. It receives an `apply`
/// function to continue template application into attributes or children;
/// nothing below the node is visited unless the handler calls it (usually
/// through [`copy`]).
pub trait TemplateHandler: Send + Sync {
    /// Rewrite the node.
    ///
    /// # Arguments
    /// * `node` - The node matched by this handler's rule
    /// * `apply` - Function to call for recursive template application
    ///
    /// # Errors
    /// Any error aborts the whole run and reaches the caller unchanged.
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment>;
}

/// Fallback used when no rule matches: copy and keep descending.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHandler;

impl TemplateHandler for IdentityHandler {
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        copy(node, apply)
    }
}

/// Handler backed by a closure. Built with [`from_fn`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> TemplateHandler for FnHandler<F>
where
    F: Fn(&Node, &ApplyFn<'_>) -> Result<Fragment> + Send + Sync,
{
    fn handle(&self, node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
        (self.f)(node, apply)
    }
}

/// Wrap a closure as a handler.
///
/// # Examples
/// ```
/// use regelrecht_transform::{from_fn, Fragment, Node, Predicate, TemplateRegistry};
///
/// let mut registry = TemplateRegistry::new();
/// registry
///     .register("drop-text", Predicate::Text, from_fn(|_node, _apply| {
///         Ok(Fragment::Sequence(vec![]))
///     }))
///     .unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
pub fn from_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Node, &ApplyFn<'_>) -> Result<Fragment> + Send + Sync,
{
    FnHandler { f }
}
