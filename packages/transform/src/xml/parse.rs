//! XML text to node tree, via `roxmltree`.

use roxmltree::{Document, ParsingOptions, NS_XML_URI};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Result, TransformError};
use crate::node::{Attributes, Node};

/// Options controlling how XML maps onto nodes.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Keep text nodes that contain only whitespace.
    pub keep_whitespace: bool,
    /// Accept documents with a DTD.
    pub allow_dtd: bool,
    /// Maximum element nesting; deeper documents are rejected.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_whitespace: false,
            allow_dtd: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse XML into a node tree using default options.
///
/// Tag and attribute names keep their prefix as written (`x:item`) and
/// namespace declarations become `xmlns`/`xmlns:*` attributes on the element
/// that declares them. Comments and processing instructions are dropped,
/// whitespace-only text is dropped.
///
/// # Examples
/// ```
/// use regelrecht_transform::xml::parse;
///
/// let node = parse(r#"<a href="http://x">t</a>"#).unwrap();
/// let element = node.as_element().unwrap();
/// assert_eq!(element.tag(), "a");
/// assert_eq!(element.attributes().get("href"), Some("http://x"));
/// ```
///
/// # Errors
/// Returns `XmlParse` with the row and column of the first syntax error,
/// or `XmlTooDeep` if elements nest deeper than the default limit.
pub fn parse(text: &str) -> Result<Node> {
    parse_with_options(text, ParseOptions::default())
}

/// Parse XML into a node tree.
///
/// # Errors
/// Returns `XmlParse` with the row and column of the first syntax error,
/// or `XmlTooDeep` if elements nest deeper than `options.max_depth`.
pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Node> {
    let parsing = ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..ParsingOptions::default()
    };
    check_nesting(text, options.max_depth)?;
    let doc = Document::parse_with_options(text, parsing)?;
    convert_element(doc.root_element(), options, 0)
}

fn convert_element(node: roxmltree::Node<'_, '_>, options: ParseOptions, depth: usize) -> Result<Node> {
    if depth >= options.max_depth {
        return Err(TransformError::XmlTooDeep {
            limit: options.max_depth,
        });
    }

    let mut attributes: Attributes = declared_namespaces(node).into_iter().collect();
    for attr in node.attributes() {
        attributes.insert(qualified_name(node, attr.namespace(), attr.name()), attr.value());
    }

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert_element(child, options, depth + 1)?);
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if options.keep_whitespace || !text.trim().is_empty() {
                children.push(Node::text(text));
            }
        }
    }

    let tag = node.tag_name();
    let tag = qualified_name(node, tag.namespace(), tag.name());
    Ok(Node::element(tag, attributes, children))
}

/// Reject documents nesting deeper than `max_depth` before `roxmltree`,
/// whose tokenizer recurses once per open element, sees them.
///
/// This is a lexical scan only: it skips comments, CDATA, processing
/// instructions, the DOCTYPE and quoted attribute values, and leaves all
/// well-formedness errors to the real parser.
pub(super) fn check_nesting(text: &str, max_depth: usize) -> Result<()> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = bytes.get(pos..).and_then(|rest| rest.iter().position(|&b| b == b'<')) {
        let start = pos + offset;
        let rest = &bytes[start..];
        pos = if rest.starts_with(b"<!--") {
            skip_past(bytes, start + 4, b"-->")
        } else if rest.starts_with(b"<![CDATA[") {
            skip_past(bytes, start + 9, b"]]>")
        } else if rest.starts_with(b"<?") {
            skip_past(bytes, start + 2, b"?>")
        } else if rest.starts_with(b"<!") {
            skip_declaration(bytes, start + 2)
        } else if rest.starts_with(b"</") {
            depth = depth.saturating_sub(1);
            skip_past(bytes, start + 2, b">")
        } else {
            let end = skip_tag(bytes, start + 1);
            let self_closing = end >= 2 && bytes.get(end - 2) == Some(&b'/');
            if depth >= max_depth {
                return Err(TransformError::XmlTooDeep { limit: max_depth });
            }
            if !self_closing {
                depth += 1;
            }
            end
        };
    }
    Ok(())
}

/// Index just past the next `pattern`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, pattern: &[u8]) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(pattern.len()).position(|w| w == pattern))
        .map_or(bytes.len(), |i| from + i + pattern.len())
}

/// Index just past the `>` ending a start tag, ignoring `>` in quoted values.
fn skip_tag(bytes: &[u8], from: usize) -> usize {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return i + 1,
            None => {}
        }
    }
    bytes.len()
}

/// Index just past a `<!DOCTYPE ...>` declaration and its internal subset.
fn skip_declaration(bytes: &[u8], from: usize) -> usize {
    let mut brackets = 0usize;
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return i + 1,
                _ => {}
            },
        }
    }
    bytes.len()
}

/// `prefix:local` for a namespaced name, `local` otherwise.
fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = namespace.and_then(|uri| {
        if uri == NS_XML_URI {
            return Some("xml");
        }
        node.namespaces()
            .filter(|ns| ns.uri() == uri)
            .find_map(|ns| ns.name())
    });
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// Namespace declarations introduced by this element, as attributes.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<(String, String)> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|ns| ns.uri() != NS_XML_URI)
        .filter(|ns| match parent {
            Some(parent) => !parent
                .namespaces()
                .any(|inherited| inherited.name() == ns.name() && inherited.uri() == ns.uri()),
            None => true,
        })
        .map(|ns| {
            let name = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            (name, ns.uri().to_string())
        })
        .collect()
}
