//! Structural identity copy.
//!
//! [`copy`] rebuilds an element around whatever `apply` returns for its
//! attributes and children. It never recurses on its own; handlers reuse it
//! for "pass through, but keep descending" and override only what they need.

use std::sync::Arc;

use crate::error::{Result, TransformError};
use crate::node::{Element, Fragment, Node};

/// Function type for recursive template application.
///
/// Handlers receive one of these to continue into attributes or children.
/// A handler that never calls it prunes everything below the node it handles.
pub type ApplyFn<'a> = dyn Fn(Fragment) -> Result<Fragment> + 'a;

/// Copy a node, delegating attributes and children to `apply`.
///
/// - Element: new element with the same tag, attributes replaced by
///   `apply(attributes)` and children replaced by `apply(children)`.
/// - Attributes and text: returned unchanged (shared, not cloned).
///
/// # Errors
/// Returns [`TransformError::NoConstruction`] when `apply` produces
/// something other than a single attributes node for the attribute slot, or
/// an attributes node in child position. Errors from `apply` propagate.
pub fn copy(node: &Node, apply: &ApplyFn<'_>) -> Result<Fragment> {
    match node {
        Node::Element(element) => {
            let attributes = apply(Fragment::Single(element.attributes_node()))?;
            let attributes = expect_attributes(attributes)?;

            let children = apply(Fragment::Sequence(element.children().to_vec()))?.into_nodes();
            if let Some(stray) = children.iter().find(|c| matches!(c, Node::Attributes(_))) {
                return Err(TransformError::NoConstruction {
                    slot: "element children",
                    found: stray.kind().to_string(),
                });
            }

            Ok(Fragment::Single(Node::from(Element::from_shared(
                element.tag(),
                attributes,
                children,
            ))))
        }
        Node::Attributes(_) | Node::Text(_) => Ok(Fragment::Single(node.clone())),
    }
}

fn expect_attributes(fragment: Fragment) -> Result<Arc<crate::node::Attributes>> {
    match fragment {
        Fragment::Single(Node::Attributes(attributes)) => Ok(attributes),
        Fragment::Single(other) => Err(TransformError::NoConstruction {
            slot: "element attributes",
            found: other.kind().to_string(),
        }),
        Fragment::Sequence(nodes) => Err(TransformError::NoConstruction {
            slot: "element attributes",
            found: format!("sequence of {}", nodes.len()),
        }),
    }
}
