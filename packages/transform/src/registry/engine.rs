//! Template engine that drives rule dispatch over a tree.

use super::core::TemplateRegistry;
use crate::config::{validate_max_depth, DEFAULT_MAX_DEPTH};
use crate::error::{Result, TransformError};
use crate::node::{Fragment, Node};
use crate::trace::{RunTrace, TraceBuilder};

/// Engine that applies a registry's rules to nodes.
///
/// The engine only dispatches: for each node it asks the registry for a
/// handler and runs it. Descending into children is up to the handler,
/// normally through [`copy`](crate::copy::copy). Runs share no state, so one
/// engine can serve many threads at once.
#[derive(Debug)]
pub struct TemplateEngine {
    registry: TemplateRegistry,
    max_depth: usize,
}

impl TemplateEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: TemplateRegistry) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the recursion limit.
    ///
    /// # Errors
    /// Returns `InvalidDepth` if the limit is outside the accepted range.
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self> {
        self.max_depth = validate_max_depth(max_depth)?;
        Ok(self)
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Apply templates to a node or a sequence of nodes.
    ///
    /// A sequence maps member by member, in order. When a handler returns a
    /// sequence for a member, its nodes are spliced in place of that member.
    ///
    /// # Errors
    /// Handler errors propagate unchanged and abort the run; no partial tree
    /// is returned. `DepthExceeded` if recursion passes the limit.
    pub fn apply_templates(&self, input: impl Into<Fragment>) -> Result<Fragment> {
        let input = input.into();
        tracing::debug!(
            rules = self.registry.len(),
            nodes = input.len(),
            "Applying templates"
        );
        let output = self.run(None).apply(input, 0)?;
        tracing::debug!(nodes = output.len(), "Templates applied");
        Ok(output)
    }

    /// Apply templates to a single root node.
    ///
    /// # Errors
    /// See [`apply_templates`](Self::apply_templates).
    pub fn transform(&self, node: &Node) -> Result<Fragment> {
        self.apply_templates(node.clone())
    }

    /// Apply templates and record which rule handled each visited node.
    ///
    /// # Errors
    /// See [`apply_templates`](Self::apply_templates).
    pub fn apply_with_trace(&self, input: impl Into<Fragment>) -> Result<(Fragment, RunTrace)> {
        let builder = TraceBuilder::new();
        let output = self.run(Some(&builder)).apply(input.into(), 0)?;
        let trace = builder.build();
        tracing::debug!(dispatches = trace.dispatch_count(), "Templates applied with trace");
        Ok((output, trace))
    }

    fn run<'r>(&'r self, trace: Option<&'r TraceBuilder>) -> Run<'r> {
        Run {
            registry: &self.registry,
            max_depth: self.max_depth,
            trace,
        }
    }
}

/// Apply templates from a registry with default settings.
///
/// # Examples
/// ```
/// use regelrecht_transform::{apply_templates, Attributes, Fragment, Node, TemplateRegistry};
///
/// let registry = TemplateRegistry::new();
/// let tree = Node::element("p", Attributes::new(), vec![Node::text("x")]);
///
/// let output = apply_templates(tree.clone(), &registry).unwrap();
/// assert_eq!(output, Fragment::Single(tree));
/// ```
///
/// # Errors
/// See [`TemplateEngine::apply_templates`].
pub fn apply_templates(input: impl Into<Fragment>, registry: &TemplateRegistry) -> Result<Fragment> {
    Run {
        registry,
        max_depth: DEFAULT_MAX_DEPTH,
        trace: None,
    }
    .apply(input.into(), 0)
}

/// State of a single run: borrowed rules and limits, nothing mutable
/// except the optional trace.
struct Run<'r> {
    registry: &'r TemplateRegistry,
    max_depth: usize,
    trace: Option<&'r TraceBuilder>,
}

impl Run<'_> {
    fn apply(&self, input: Fragment, depth: usize) -> Result<Fragment> {
        match input {
            Fragment::Single(node) => self.dispatch(&node, depth),
            Fragment::Sequence(nodes) => {
                let mut output = Vec::with_capacity(nodes.len());
                for node in &nodes {
                    match self.dispatch(node, depth)? {
                        Fragment::Single(node) => output.push(node),
                        Fragment::Sequence(spliced) => output.extend(spliced),
                    }
                }
                Ok(Fragment::Sequence(output))
            }
        }
    }

    fn dispatch(&self, node: &Node, depth: usize) -> Result<Fragment> {
        if depth >= self.max_depth {
            return Err(TransformError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let (rule, handler) = self.registry.resolve_named(node);
        tracing::trace!(rule, kind = %node.kind(), depth, "Dispatching node");

        if let Some(trace) = self.trace {
            trace.enter(node, rule);
        }
        let recurse = |input: Fragment| self.apply(input, depth + 1);
        let result = handler.handle(node, &recurse);
        if let Some(trace) = self.trace {
            trace.exit();
        }

        result
    }
}
