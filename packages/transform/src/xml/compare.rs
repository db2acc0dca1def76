//! Structural comparison of two XML documents.

use roxmltree::{Document, NodeType, ParsingOptions};

use super::parse::{check_nesting, ParseOptions};
use crate::config::TRACE_TEXT_PREVIEW;
use crate::error::Result;

type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Compare two XML documents and describe the first difference.
///
/// Elements are compared by expanded name (namespace URI and local name)
/// and by their attributes in order. Text, comments and processing
/// instructions must match exactly, except that whitespace-only text is
/// ignored on both sides. Quoting style, self-closing tags, entity
/// spelling and the choice of namespace prefix are not differences.
///
/// # Examples
/// ```
/// use regelrecht_transform::xml::{first_difference, ParseOptions};
///
/// let same = first_difference("<a x='1'><b></b></a>", r#"<a x="1"><b/></a>"#, ParseOptions::default());
/// assert_eq!(same.unwrap(), None);
///
/// let changed = first_difference("<a><!-- c --></a>", "<a/>", ParseOptions::default());
/// assert!(changed.unwrap().is_some());
/// ```
///
/// # Errors
/// Returns `XmlParse` or `XmlTooDeep` if either document cannot be parsed.
pub fn first_difference(expected: &str, actual: &str, options: ParseOptions) -> Result<Option<String>> {
    let expected = load(expected, options)?;
    let actual = load(actual, options)?;

    let mut stack = vec![(
        significant_children(expected.root()),
        significant_children(actual.root()),
    )];
    while let Some((left, right)) = stack.last_mut() {
        let pair = (left.next(), right.next());
        match pair {
            (None, None) => {
                stack.pop();
            }
            (Some(a), Some(b)) => {
                if let Some(difference) = compare_nodes(a, b) {
                    return Ok(Some(difference));
                }
                if a.is_element() {
                    stack.push((significant_children(a), significant_children(b)));
                }
            }
            (Some(a), None) => return Ok(Some(format!("missing {}", describe(a)))),
            (None, Some(b)) => return Ok(Some(format!("unexpected {}", describe(b)))),
        }
    }
    Ok(None)
}

fn load(text: &str, options: ParseOptions) -> Result<Document<'_>> {
    check_nesting(text, options.max_depth)?;
    let parsing = ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(text, parsing)?)
}

fn significant_children<'a, 'input>(
    node: XmlNode<'a, 'input>,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    node.children()
        .filter(|child| !(child.is_text() && child.text().unwrap_or_default().trim().is_empty()))
}

fn compare_nodes(expected: XmlNode<'_, '_>, actual: XmlNode<'_, '_>) -> Option<String> {
    let same = expected.node_type() == actual.node_type()
        && match expected.node_type() {
            NodeType::Element => {
                expected.tag_name() == actual.tag_name()
                    && attribute_list(expected) == attribute_list(actual)
            }
            NodeType::Text | NodeType::Comment => expected.text() == actual.text(),
            NodeType::PI => expected.pi() == actual.pi(),
            NodeType::Root => true,
        };

    (!same).then(|| format!("expected {}, found {}", describe(expected), describe(actual)))
}

fn attribute_list<'a>(node: XmlNode<'a, '_>) -> Vec<(Option<&'a str>, &'a str, &'a str)> {
    node.attributes()
        .map(|attr| (attr.namespace(), attr.name(), attr.value()))
        .collect()
}

fn expanded(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(uri) => format!("{{{uri}}}{local}"),
        None => local.to_string(),
    }
}

fn preview(text: &str) -> String {
    let mut short: String = text.chars().take(TRACE_TEXT_PREVIEW).collect();
    if short.len() < text.len() {
        short.push_str("...");
    }
    format!("{short:?}")
}

fn describe(node: XmlNode<'_, '_>) -> String {
    match node.node_type() {
        NodeType::Element => {
            let tag = node.tag_name();
            let mut out = format!("element <{}", expanded(tag.namespace(), tag.name()));
            for (namespace, name, value) in attribute_list(node) {
                out.push_str(&format!(" {}={value:?}", expanded(namespace, name)));
            }
            out.push('>');
            out
        }
        NodeType::Text => format!("text {}", preview(node.text().unwrap_or_default())),
        NodeType::Comment => format!("comment {}", preview(node.text().unwrap_or_default())),
        NodeType::PI => {
            let target = node.pi().map(|pi| pi.target).unwrap_or_default();
            format!("processing instruction <?{target}?>")
        }
        NodeType::Root => "document".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(expected: &str, actual: &str) -> Option<String> {
        first_difference(expected, actual, ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_equivalent_spellings_match() {
        assert_eq!(
            diff(
                "<a x='1'>\n  <b></b>\n  <c>&amp;</c>\n</a>",
                r#"<a x="1"><b/><c>&#38;</c></a>"#
            ),
            None
        );
        assert_eq!(
            diff(
                r#"<p:a xmlns:p="urn:x"/>"#,
                r#"<q:a xmlns:q="urn:x"/>"#
            ),
            None
        );
    }

    #[test]
    fn test_missing_comment_and_pi() {
        let missing = diff("<a><!-- c --><b/></a>", "<a><b/></a>").unwrap();
        assert_eq!(missing, r#"expected comment " c ", found element <b>"#);

        let missing = diff("<a><?pi x?></a>", "<a/>").unwrap();
        assert_eq!(missing, "missing processing instruction <?pi?>");
    }

    #[test]
    fn test_namespaced_attributes_differ() {
        let changed = diff(
            r#"<i xmlns:x="urn:x" xmlns:y="urn:y" x:id="1" y:id="2"/>"#,
            r#"<i id="2"/>"#,
        )
        .unwrap();
        assert!(changed.contains("{urn:x}id=\"1\""), "{changed}");
    }

    #[test]
    fn test_extra_and_changed_nodes() {
        assert_eq!(
            diff("<a><b/></a>", "<a><b/><c/></a>").unwrap(),
            "unexpected element <c>"
        );
        assert_eq!(
            diff("<a>one</a>", "<a>two</a>").unwrap(),
            r#"expected text "one", found text "two""#
        );
    }
}
