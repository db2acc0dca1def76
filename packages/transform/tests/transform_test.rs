//! End-to-end tests for template application.
//!
//! Covers the engine's observable properties: identity, order preservation,
//! override by registration order, pruning and link rewriting.

use std::fs;
use std::path::Path;
use std::thread;

use pretty_assertions::assert_eq;

use regelrecht_transform::registry::handlers::{
    PruneHandler, RenameHandler, SecureLinkHandler, UnwrapHandler,
};
use regelrecht_transform::registry::{create_identity_registry, create_secure_links_registry};
use regelrecht_transform::config::{DEFAULT_MAX_DEPTH, MAX_ALLOWED_DEPTH};
use regelrecht_transform::xml::{first_difference, parse, serialize, serialize_fragment, ParseOptions};
use regelrecht_transform::{
    apply_templates, copy, from_fn, Attributes, Fragment, Node, Predicate, TemplateEngine,
    TemplateRegistry, TransformError,
};

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn list() -> Vec<Node> {
    vec![
        Node::element("li", Attributes::new(), vec![Node::text("one")]),
        Node::element("li", Attributes::new(), vec![Node::text("two")]),
    ]
}

fn single(fragment: Fragment) -> Node {
    fragment.into_single().expect("single node output")
}

#[test]
fn test_identity_reproduces_document() {
    let xml = load_fixture("links.xml");
    let xml = xml.trim();
    let engine = TemplateEngine::new(create_identity_registry());

    let output = engine.transform(&parse(xml).unwrap()).unwrap();
    assert_eq!(serialize_fragment(&output), xml);
}

#[test]
fn test_identity_is_idempotent() {
    let tree = parse(&load_fixture("links.xml")).unwrap();
    let engine = TemplateEngine::new(create_identity_registry());

    let once = single(engine.transform(&tree).unwrap());
    let twice = single(engine.transform(&once).unwrap());
    assert_eq!(once, twice);
    assert_eq!(once, tree);
}

#[test]
fn test_identity_shares_leaves() {
    let tree = Node::element("p", Attributes::new(), vec![Node::text("shared")]);
    let engine = TemplateEngine::new(create_identity_registry());

    let output = single(engine.transform(&tree).unwrap());
    let before = &tree.as_element().unwrap().children()[0];
    let after = &output.as_element().unwrap().children()[0];
    assert!(before.ptr_eq(after));
}

#[test]
fn test_sequence_identity_preserves_order_and_length() {
    let output = apply_templates(list(), &create_identity_registry()).unwrap();
    assert_eq!(output, Fragment::Sequence(list()));
}

#[test]
fn test_override_by_registration_order() {
    let tag_li = || from_fn(|_node, _apply| Ok(Fragment::Single(Node::text("narrow"))));
    let any_element = || from_fn(|_node, _apply| Ok(Fragment::Single(Node::text("broad"))));
    let input = list().remove(0);

    let mut narrow_first = TemplateRegistry::new();
    narrow_first.register("li", Predicate::tag("li"), tag_li()).unwrap();
    narrow_first.register("element", Predicate::Element, any_element()).unwrap();

    let mut broad_first = TemplateRegistry::new();
    broad_first.register("element", Predicate::Element, any_element()).unwrap();
    broad_first.register("li", Predicate::tag("li"), tag_li()).unwrap();

    assert_eq!(
        apply_templates(input.clone(), &narrow_first).unwrap(),
        Fragment::Single(Node::text("narrow"))
    );
    assert_eq!(
        apply_templates(input, &broad_first).unwrap(),
        Fragment::Single(Node::text("broad"))
    );
}

#[test]
fn test_pruning_removes_whole_subtree() {
    let mut registry = TemplateRegistry::new();
    registry.register("prune", Predicate::Element, PruneHandler::default()).unwrap();

    let tree = Node::element("ul", Attributes::new(), list());
    let output = apply_templates(tree, &registry).unwrap();
    assert_eq!(output, Fragment::Single(Node::text("")));
}

#[test]
fn test_handler_without_recursion_prunes_children() {
    let mut registry = TemplateRegistry::new();
    registry
        .register(
            "shallow-li",
            Predicate::tag("li"),
            from_fn(|node, _apply| {
                let tag = node.as_element().map(|e| e.tag()).unwrap_or_default();
                Ok(Fragment::Single(Node::element(tag, Attributes::new(), vec![])))
            }),
        )
        .unwrap();

    let tree = Node::element("ul", Attributes::new(), list());
    let output = single(apply_templates(tree, &registry).unwrap());
    assert_eq!(serialize(&output), "<ul><li/><li/></ul>");
}

#[test]
fn test_secure_link_scenario() {
    let input = Node::element(
        "a",
        Attributes::new().with("href", "http://x"),
        vec![Node::text("t")],
    );
    let mut registry = TemplateRegistry::new();
    registry
        .register("secure-links", Predicate::has_attribute("href"), SecureLinkHandler::default())
        .unwrap();

    let output = apply_templates(input, &registry).unwrap();
    let expected = Node::element(
        "a",
        Attributes::new().with("href", "https://x"),
        vec![Node::text("t")],
    );
    assert_eq!(output, Fragment::Single(expected));
}

#[test]
fn test_secure_links_on_document() {
    let engine = TemplateEngine::new(create_secure_links_registry().unwrap());
    let output = engine.transform(&parse(&load_fixture("links.xml")).unwrap()).unwrap();
    let xml = serialize_fragment(&output);

    assert!(xml.contains(r#"<a href="https://wetten.overheid.nl/BWBR0018451">law</a>"#));
    assert!(xml.contains(r#"<a href="https://example.org">notes</a>"#));
    assert!(xml.contains(r#"<img src="https://example.org/logo.png"/>"#));
    assert!(!xml.contains("http://"));
}

#[test]
fn test_combined_rules_on_document() {
    let mut registry = TemplateRegistry::new();
    registry.register("drop-script", Predicate::tag("script"), PruneHandler::remove()).unwrap();
    registry.register("flatten-body", Predicate::tag("body"), UnwrapHandler).unwrap();
    registry.register("ul-to-ol", Predicate::tag("ul"), RenameHandler::new("ol")).unwrap();
    let engine = TemplateEngine::new(registry);

    let output = engine.transform(&parse(&load_fixture("links.xml")).unwrap()).unwrap();
    let xml = serialize_fragment(&output);

    assert!(xml.starts_with("<html><p class=\"intro\">"));
    assert!(xml.contains("<ol><li>one</li><li>two</li></ol>"));
    assert!(!xml.contains("script"));
    assert!(!xml.contains("<body>"));
}

#[test]
fn test_custom_handler_composes_with_copy() {
    // Copy every element but upper-case its text children.
    let mut registry = TemplateRegistry::new();
    registry
        .register(
            "shout",
            Predicate::Text,
            from_fn(|node, _apply| {
                let text = node.as_text().unwrap_or_default().to_uppercase();
                Ok(Fragment::Single(Node::text(text)))
            }),
        )
        .unwrap();
    registry
        .register("li", Predicate::tag("li"), from_fn(|node, apply| copy(node, apply)))
        .unwrap();

    let output = apply_templates(list(), &registry).unwrap();
    let rendered = serialize_fragment(&output);
    assert_eq!(rendered, "<li>ONE</li><li>TWO</li>");
}

#[test]
fn test_handler_error_returns_no_partial_tree() {
    let mut registry = TemplateRegistry::new();
    registry
        .register(
            "reject-two",
            Predicate::Text,
            from_fn(|node, apply| {
                if node.as_text() == Some("two") {
                    return Err(TransformError::handler("reject-two", "unexpected text"));
                }
                copy(node, apply)
            }),
        )
        .unwrap();

    let result = apply_templates(list(), &registry);
    assert!(matches!(result, Err(TransformError::Handler { .. })));
}

#[test]
fn test_attribute_handler_producing_text_is_no_construction() {
    let mut registry = TemplateRegistry::new();
    registry
        .register(
            "bad-attrs",
            Predicate::Attributes,
            from_fn(|_node, _apply| Ok(Fragment::Single(Node::text("not attributes")))),
        )
        .unwrap();

    let err = apply_templates(list(), &registry).unwrap_err();
    assert!(matches!(err, TransformError::NoConstruction { .. }));
}

#[test]
fn test_deep_tree_hits_depth_limit_instead_of_overflowing() {
    let mut tree = Node::text("leaf");
    for _ in 0..2_000 {
        tree = Node::element("div", Attributes::new(), vec![tree]);
    }

    let engine = TemplateEngine::new(create_identity_registry());
    let err = engine.transform(&tree).unwrap_err();
    assert!(matches!(err, TransformError::DepthExceeded { .. }));
}

fn nested_divs(levels: usize) -> Node {
    let mut tree = Node::text("leaf");
    for _ in 0..levels {
        tree = Node::element("div", Attributes::new(), vec![tree]);
    }
    tree
}

#[test]
fn test_max_allowed_depth_fits_spawned_thread() {
    // The leaf sits at depth MAX_ALLOWED_DEPTH - 1, the deepest accepted.
    let handle = thread::spawn(|| {
        let engine = TemplateEngine::new(create_identity_registry())
            .with_max_depth(MAX_ALLOWED_DEPTH)
            .unwrap();
        let tree = nested_divs(MAX_ALLOWED_DEPTH - 1);
        let output = engine.transform(&tree).unwrap();
        assert_eq!(output, Fragment::Single(tree));

        let too_deep = nested_divs(MAX_ALLOWED_DEPTH);
        let err = engine.transform(&too_deep).unwrap_err();
        assert!(matches!(err, TransformError::DepthExceeded { limit } if limit == MAX_ALLOWED_DEPTH));
    });
    handle.join().unwrap();
}

#[test]
fn test_deep_xml_is_rejected_before_parsing() {
    let levels = 100_000;
    let xml = format!("{}{}", "<d>".repeat(levels), "</d>".repeat(levels));

    let err = thread::spawn(move || parse(&xml).unwrap_err()).join().unwrap();
    assert!(matches!(err, TransformError::XmlTooDeep { limit } if limit == DEFAULT_MAX_DEPTH));
}

#[test]
fn test_namespaced_document_round_trips() {
    let xml = r#"<x:root xmlns:x="urn:x" xmlns:y="urn:y"><x:item x:id="1" y:id="2">t</x:item></x:root>"#;
    let engine = TemplateEngine::new(create_identity_registry());

    let output = serialize_fragment(&engine.transform(&parse(xml).unwrap()).unwrap());
    assert_eq!(first_difference(xml, &output, ParseOptions::default()).unwrap(), None);
    assert!(output.contains(r#"<x:item x:id="1" y:id="2">"#));
}

#[test]
fn test_runs_are_independent_across_threads() {
    let secure = TemplateEngine::new(create_secure_links_registry().unwrap());
    let identity = TemplateEngine::new(create_identity_registry());
    let tree = parse(&load_fixture("links.xml")).unwrap();

    thread::scope(|scope| {
        let secure_run = scope.spawn(|| serialize_fragment(&secure.transform(&tree).unwrap()));
        let identity_run = scope.spawn(|| serialize_fragment(&identity.transform(&tree).unwrap()));

        let secured = secure_run.join().unwrap();
        let unchanged = identity_run.join().unwrap();
        assert!(!secured.contains("http://"));
        assert_eq!(unchanged, serialize(&tree));
    });
}

#[test]
fn test_json_tree_input() {
    let tree: Node = serde_json::from_str(&load_fixture("list.json")).unwrap();
    let output = apply_templates(tree, &create_identity_registry()).unwrap();
    assert_eq!(
        serialize_fragment(&output),
        "<ul><li>one</li><li>two</li></ul>"
    );
}

#[test]
fn test_trace_shows_pruned_subtree_absent() {
    let mut registry = TemplateRegistry::new();
    registry.register("drop-script", Predicate::tag("script"), PruneHandler::remove()).unwrap();
    let engine = TemplateEngine::new(registry);

    let tree = parse("<p><script>x</script>t</p>").unwrap();
    let (_, trace) = engine.apply_with_trace(tree).unwrap();

    assert_eq!(
        trace.render(),
        "<p> [identity]\n+-- @{} [identity]\n+-- <script> [drop-script]\n`-- \"t\" [identity]"
    );
}
