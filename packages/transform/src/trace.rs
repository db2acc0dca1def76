//! Dispatch tracing for debugging rule sets.
//!
//! A trace records, for every node the engine dispatched, which rule handled
//! it. Nesting follows recursion: a node's trace children are the nodes its
//! handler chose to visit. A subtree absent from the trace was pruned.
//!
//! ```text
//! <a> [identity]
//! +-- @{href} [secure-links]
//! `-- "t" [identity]
//! ```

use std::cell::RefCell;

use serde::Serialize;

use crate::config::TRACE_TEXT_PREVIEW;
use crate::node::{Node, NodeKind};

/// One dispatched node in the trace tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTrace {
    /// Variant of the dispatched node
    pub kind: NodeKind,

    /// Short description (tag, attribute keys or text preview)
    pub label: String,

    /// Name of the rule that handled the node
    pub rule: String,

    /// Nodes dispatched while the handler ran
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DispatchTrace>,
}

impl DispatchTrace {
    #[must_use]
    pub fn new(node: &Node, rule: impl Into<String>) -> Self {
        Self {
            kind: node.kind(),
            label: node_label(node),
            rule: rule.into(),
            children: Vec::new(),
        }
    }

    /// Number of dispatches in this subtree, including this one.
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DispatchTrace::dispatch_count)
            .sum::<usize>()
    }

    /// Render the trace as a tree using `+-- ` and `` `-- `` connectors.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!("{} [{}]", self.label, self.rule)];
        self.render_children("", &mut lines);
        lines.join("\n")
    }

    fn render_children(&self, indent: &str, lines: &mut Vec<String>) {
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let is_last = i + 1 == count;
            let (branch, continuation) = if is_last {
                ("`-- ", "    ")
            } else {
                ("+-- ", "|   ")
            };
            lines.push(format!("{indent}{branch}{} [{}]", child.label, child.rule));
            child.render_children(&format!("{indent}{continuation}"), lines);
        }
    }
}

/// Trace of one whole run. A sequence input produces several roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTrace {
    pub roots: Vec<DispatchTrace>,
}

impl RunTrace {
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.roots.iter().map(DispatchTrace::dispatch_count).sum()
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.roots
            .iter()
            .map(DispatchTrace::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds a [`RunTrace`] while the engine recurses.
///
/// Uses interior mutability because handlers only get a shared `apply`
/// closure. A run is single-threaded, so `RefCell` is enough.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    stack: RefCell<Vec<DispatchTrace>>,
    roots: RefCell<Vec<DispatchTrace>>,
}

impl TraceBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording a dispatch.
    pub fn enter(&self, node: &Node, rule: &str) {
        self.stack.borrow_mut().push(DispatchTrace::new(node, rule));
    }

    /// Finish the innermost dispatch and attach it to its parent.
    pub fn exit(&self) {
        let mut stack = self.stack.borrow_mut();
        let Some(done) = stack.pop() else {
            return;
        };
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => self.roots.borrow_mut().push(done),
        }
    }

    #[must_use]
    pub fn build(self) -> RunTrace {
        RunTrace {
            roots: self.roots.into_inner(),
        }
    }
}

/// Short label for a node in traces.
fn node_label(node: &Node) -> String {
    match node {
        Node::Element(element) => format!("<{}>", element.tag()),
        Node::Attributes(attributes) => {
            let keys: Vec<&str> = attributes.iter().map(|(k, _)| k).collect();
            format!("@{{{}}}", keys.join(","))
        }
        Node::Text(text) => {
            let preview: String = text.chars().take(TRACE_TEXT_PREVIEW).collect();
            if text.chars().count() > TRACE_TEXT_PREVIEW {
                format!("{preview:?}...")
            } else {
                format!("{preview:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attributes;

    #[test]
    fn test_node_labels() {
        assert_eq!(
            node_label(&Node::element("a", Attributes::new(), vec![])),
            "<a>"
        );
        assert_eq!(
            node_label(&Node::attributes(
                Attributes::new().with("href", "x").with("id", "y")
            )),
            "@{href,id}"
        );
        assert_eq!(node_label(&Node::text("t")), "\"t\"");

        let long = "x".repeat(TRACE_TEXT_PREVIEW + 5);
        assert!(node_label(&Node::text(&long)).ends_with("..."));
    }

    #[test]
    fn test_builder_nests_by_enter_exit() {
        let root = Node::element("a", Attributes::new(), vec![]);
        let attrs = Node::attributes(Attributes::new().with("href", "x"));
        let text = Node::text("t");

        let builder = TraceBuilder::new();
        builder.enter(&root, "identity");
        builder.enter(&attrs, "secure-links");
        builder.exit();
        builder.enter(&text, "identity");
        builder.exit();
        builder.exit();

        let trace = builder.build();
        assert_eq!(trace.roots.len(), 1);
        assert_eq!(trace.dispatch_count(), 3);
        assert_eq!(
            trace.render(),
            "<a> [identity]\n+-- @{href} [secure-links]\n`-- \"t\" [identity]"
        );
    }

    #[test]
    fn test_render_nested_continuation() {
        let mut root = DispatchTrace::new(&Node::element("ul", Attributes::new(), vec![]), "identity");
        let mut first = DispatchTrace::new(&Node::element("li", Attributes::new(), vec![]), "li");
        first
            .children
            .push(DispatchTrace::new(&Node::text("one"), "identity"));
        root.children.push(first);
        root.children
            .push(DispatchTrace::new(&Node::element("li", Attributes::new(), vec![]), "li"));

        assert_eq!(
            root.render(),
            "<ul> [identity]\n+-- <li> [li]\n|   `-- \"one\" [identity]\n`-- <li> [li]"
        );
    }

    #[test]
    fn test_exit_without_enter_is_ignored() {
        let builder = TraceBuilder::new();
        builder.exit();
        assert_eq!(builder.build().dispatch_count(), 0);
    }

    #[test]
    fn test_trace_serializes_to_json() {
        let trace = DispatchTrace::new(&Node::text("t"), "identity");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["rule"], "identity");
        assert!(json.get("children").is_none());
    }
}
