//! RegelRecht Transform - Rule-based rewriting of element trees.
//!
//! A tree of [`Node`]s is rewritten by dispatching each visited node to the
//! first matching rule of a [`TemplateRegistry`]. Nodes no rule claims are
//! copied by the identity fallback, which keeps descending into children,
//! so a registry only has to describe what changes.
//!
//! # Example
//!
//! ```
//! use regelrecht_transform::registry::handlers::SecureLinkHandler;
//! use regelrecht_transform::{Attributes, Fragment, Node, Predicate, TemplateEngine, TemplateRegistry};
//!
//! let mut registry = TemplateRegistry::new();
//! registry
//!     .register("secure-links", Predicate::has_attribute("href"), SecureLinkHandler::default())
//!     .unwrap();
//! let engine = TemplateEngine::new(registry);
//!
//! let input = Node::element(
//!     "a",
//!     Attributes::new().with("href", "http://x"),
//!     vec![Node::text("t")],
//! );
//! let output = engine.transform(&input).unwrap();
//!
//! let expected = Node::element(
//!     "a",
//!     Attributes::new().with("href", "https://x"),
//!     vec![Node::text("t")],
//! );
//! assert_eq!(output, Fragment::Single(expected));
//! ```
//!
//! # Architecture
//!
//! - [`node`]: Node model (element, attributes, text) and [`Fragment`]
//! - [`copy`]: Structural identity copy that handlers compose with
//! - [`predicate`]: Introspectable rule predicates
//! - [`registry`]: Rules, handlers and the dispatch engine
//! - [`trace`]: Per-run dispatch traces
//! - [`xml`]: XML parsing and serialization adapters
//! - [`config`]: Limits and validation
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod copy;
pub mod error;
pub mod node;
pub mod predicate;
pub mod registry;
pub mod trace;
pub mod xml;

// Re-export commonly used items
pub use copy::{copy, ApplyFn};
pub use error::{Result, TransformError};
pub use node::{Attributes, Element, Fragment, Node, NodeKind};
pub use predicate::Predicate;
pub use registry::{
    apply_templates, from_fn, IdentityHandler, Rule, TemplateEngine, TemplateHandler,
    TemplateRegistry,
};
pub use trace::{DispatchTrace, RunTrace};
