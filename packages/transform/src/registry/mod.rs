//! Template registry system for rule-based tree rewriting.
//!
//! Rules pair a [`Predicate`](crate::Predicate) with a handler. The engine
//! dispatches every node it is asked to visit to the first matching rule,
//! or copies it when none matches.

mod config;
mod core;
mod engine;
mod handler;
pub mod handlers;

pub use config::{
    create_identity_registry, create_secure_links_registry, AttributeAssignment, RuleSet,
};
pub use core::{Rule, TemplateRegistry};
pub use engine::{apply_templates, TemplateEngine};
pub use handler::{from_fn, FnHandler, IdentityHandler, TemplateHandler};
