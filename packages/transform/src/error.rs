//! Error types for the transformer.
//!
//! There is deliberately no "rule not found" variant: the identity
//! fallback makes dispatch total over well-formed trees.

use thiserror::Error;

/// Main error type for the transformer library.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A node ended up in a position its variant cannot occupy.
    #[error("Cannot construct {slot}: got {found} node")]
    NoConstruction { slot: &'static str, found: String },

    /// Recursion went deeper than the configured limit.
    #[error("Maximum template depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// A rule predicate nests deeper than allowed.
    #[error("Predicate for rule '{rule}' nests {depth} levels deep (max {max})")]
    PredicateTooDeep {
        rule: String,
        depth: usize,
        max: usize,
    },

    /// Invalid depth limit.
    #[error("Invalid max depth: {0}. Expected a value between 1 and {max}", max = crate::config::MAX_ALLOWED_DEPTH)]
    InvalidDepth(usize),

    /// Error raised by a user-supplied handler.
    #[error("Handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },

    /// Identity transform did not reproduce its input.
    #[error("Identity transform changed {path}: {difference}")]
    IdentityMismatch { path: String, difference: String },

    /// XML parsing failed.
    #[error("XML parsing failed at {row}:{col}: {message}")]
    XmlParse {
        row: u32,
        col: u32,
        message: String,
    },

    /// XML input nests deeper than the parser accepts.
    #[error("XML nesting exceeds maximum depth of {limit}")]
    XmlTooDeep { limit: usize },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    /// Build a handler error from any displayable message.
    pub fn handler(handler: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Handler {
            handler: handler.into(),
            message: message.to_string(),
        }
    }
}

impl From<roxmltree::Error> for TransformError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        Self::XmlParse {
            row: pos.row,
            col: pos.col,
            message: err.to_string(),
        }
    }
}

/// Result type alias for transformer operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_construction_display() {
        let err = TransformError::NoConstruction {
            slot: "element attributes",
            found: "text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot construct element attributes: got text node"
        );
    }

    #[test]
    fn test_handler_error_display() {
        let err = TransformError::handler("secure-links", "bad value");
        assert_eq!(err.to_string(), "Handler 'secure-links' failed: bad value");
    }

    #[test]
    fn test_invalid_depth_display() {
        let err = TransformError::InvalidDepth(0);
        assert!(err.to_string().contains("between 1 and"));
    }

    #[test]
    fn test_identity_mismatch_display() {
        let err = TransformError::IdentityMismatch {
            path: "in.xml".to_string(),
            difference: "missing comment".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Identity transform changed in.xml: missing comment"
        );
    }

    #[test]
    fn test_xml_error_carries_position() {
        let err = roxmltree::Document::parse("<a><b></a>").unwrap_err();
        let err = TransformError::from(err);
        match err {
            TransformError::XmlParse { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
