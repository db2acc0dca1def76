//! Node tree to compact XML text.

use crate::node::{Attributes, Fragment, Node};

/// Serialize a node as compact XML.
///
/// Childless elements are self-closing. A bare Attributes node has no XML
/// form of its own and renders as nothing.
///
/// # Examples
/// ```
/// use regelrecht_transform::xml::serialize;
/// use regelrecht_transform::{Attributes, Node};
///
/// let node = Node::element(
///     "a",
///     Attributes::new().with("href", "https://x"),
///     vec![Node::text("t")],
/// );
/// assert_eq!(serialize(&node), r#"<a href="https://x">t</a>"#);
/// ```
#[must_use]
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serialize a fragment; sequence members are concatenated.
#[must_use]
pub fn serialize_fragment(fragment: &Fragment) -> String {
    let mut out = String::new();
    match fragment {
        Fragment::Single(node) => write_node(node, &mut out),
        Fragment::Sequence(nodes) => {
            for node in nodes {
                write_node(node, &mut out);
            }
        }
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => {
            out.push('<');
            out.push_str(element.tag());
            write_attributes(element.attributes(), out);

            if element.children().is_empty() {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in element.children() {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(element.tag());
            out.push('>');
        }
        Node::Attributes(_) => {}
        Node::Text(text) => escape_into(text, false, out),
    }
}

fn write_attributes(attributes: &Attributes, out: &mut String) {
    for (name, value) in attributes.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    #[test]
    fn test_serialize_self_closing() {
        let node = Node::element("br", Attributes::new(), vec![]);
        assert_eq!(serialize(&node), "<br/>");
    }

    #[test]
    fn test_serialize_escapes() {
        let node = Node::element(
            "p",
            Attributes::new().with("title", "a \"b\" & c"),
            vec![Node::text("1 < 2 & 3 > 2")],
        );
        assert_eq!(
            serialize(&node),
            r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp; 3 &gt; 2</p>"#
        );
    }

    #[test]
    fn test_serialize_parse_agree() {
        let xml = r#"<ul class="x"><li>one &amp; two</li><li/></ul>"#;
        assert_eq!(serialize(&parse(xml).unwrap()), xml);
    }

    #[test]
    fn test_serialize_fragment_concatenates() {
        let fragment = Fragment::Sequence(vec![Node::text("a"), Node::text("b")]);
        assert_eq!(serialize_fragment(&fragment), "ab");
    }

    #[test]
    fn test_bare_attributes_render_empty() {
        let node = Node::attributes(Attributes::new().with("k", "v"));
        assert_eq!(serialize(&node), "");
    }
}
