//! Configuration constants and validation for the transformer.
//!
//! Template application is recursive: every handler that descends into
//! children goes one level deeper. These limits turn pathological input
//! into a typed error instead of a stack overflow.

use crate::error::{Result, TransformError};

/// Default maximum template depth for a single run.
///
/// A limit of `n` allows dispatch depths `0..n`: the root is dispatched at
/// depth 0 and every `apply` a handler issues goes one level deeper. The
/// same limit caps element nesting in the XML parser. 128 covers any
/// realistic document (law XML rarely exceeds 20 levels).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Upper bound accepted for a user-supplied depth limit.
///
/// A run at this depth must fit the 2 MiB stack of a spawned thread in an
/// unoptimised build. Each level costs a handful of frames (dispatch,
/// handler, `copy`, the `apply` closure), so this stays well below what
/// the stack could hold.
pub const MAX_ALLOWED_DEPTH: usize = 256;

/// Maximum nesting of `And`/`Or`/`Not` inside a rule predicate.
pub const MAX_PREDICATE_DEPTH: usize = 32;

/// Number of characters of text shown in trace labels.
pub const TRACE_TEXT_PREVIEW: usize = 20;

/// Name recorded in traces when no rule matched.
pub const IDENTITY_RULE_NAME: &str = "identity";

/// Validate a user-supplied depth limit.
///
/// # Examples
/// ```
/// use regelrecht_transform::config::validate_max_depth;
///
/// assert!(validate_max_depth(64).is_ok());
/// assert!(validate_max_depth(0).is_err());
/// ```
pub fn validate_max_depth(depth: usize) -> Result<usize> {
    if (1..=MAX_ALLOWED_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(TransformError::InvalidDepth(depth))
    }
}
