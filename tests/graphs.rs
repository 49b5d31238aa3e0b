mod common;

use std::collections::HashSet;

use common::*;
use serde_json::json;
use streamgraph::callable::{Callable, Signature};
use streamgraph::graph::{
    Chain, ConditionalNode, GraphValue, Layer, LayerChildren, Node, ValidationError,
};

#[test]
fn node_defaults_come_from_the_signature() {
    let node = Node::new(Callable::new(
        Signature::new("score", ["text", "weights"]).with_doc("Score a document."),
        |_| Ok(json!(0)),
    ));
    assert_eq!(node.name(), "score");
    assert_eq!(node.description(), Some("Score a document."));
    assert_eq!(node.parameters(), ["text", "weights"]);
    assert!(!node.accepts_variadic());
}

#[test]
fn node_name_and_description_are_overridable() {
    let node = identity_node("id")
        .with_name("renamed")
        .with_description("does nothing");
    assert_eq!(node.name(), "renamed");
    assert_eq!(node.description(), Some("does nothing"));
}

#[test]
fn variadic_signatures_carry_markers() {
    let sig = Signature::new("collect", ["first"])
        .with_var_positional("rest")
        .with_var_keyword("options");
    assert_eq!(sig.parameters(), ["first", "rest*", "options**"]);
    assert!(sig.accepts_variadic());
}

#[test]
fn chain_requires_at_least_two_children() {
    let err = Chain::new(vec![identity_node("only").into()]).unwrap_err();
    assert!(matches!(err, ValidationError::ChainTooShort { got: 1 }));
    let err = Chain::new(vec![]).unwrap_err();
    assert!(matches!(err, ValidationError::ChainTooShort { got: 0 }));
}

#[test]
fn layer_rejects_direct_layer_children() {
    let inner = Layer::new(vec![
        identity_node("a").into(),
        identity_node("b").into(),
    ])
    .unwrap();
    let err = Layer::new(vec![GraphValue::Layer(inner), identity_node("c").into()]).unwrap_err();
    assert!(matches!(err, ValidationError::NestedLayer { .. }));
}

#[test]
fn layer_wrapped_in_chain_can_nest() {
    let inner = Layer::new(vec![
        identity_node("a").into(),
        identity_node("b").into(),
    ])
    .unwrap();
    let chain = Chain::new(vec![GraphValue::Layer(inner), identity_node("c").into()]).unwrap();
    let outer = Layer::new(vec![GraphValue::Chain(chain), identity_node("d").into()]);
    assert!(outer.is_ok());
}

#[test]
fn derived_names_join_child_names() {
    let chain = Chain::new(vec![
        identity_node("f").into(),
        identity_node("g").into(),
    ])
    .unwrap();
    assert_eq!(chain.name(), "f -> g");

    let layer = Layer::new(vec![
        identity_node("f").into(),
        identity_node("g").into(),
    ])
    .unwrap();
    assert_eq!(layer.name(), "f | g");

    let named = Layer::named(vec![
        ("first".to_string(), GraphValue::from(identity_node("f"))),
        ("second".to_string(), GraphValue::from(identity_node("g"))),
    ])
    .unwrap();
    assert_eq!(named.name(), "f | g");
    assert!(named.children().is_named());
}

#[test]
fn every_identifier_in_a_structure_is_distinct() {
    let cond = ConditionalNode::new(
        non_negative_predicate("check"),
        identity_node("pos"),
        identity_node("neg"),
    );
    let chain = Chain::new(vec![
        identity_node("in").into(),
        GraphValue::Conditional(cond),
        Layer::new(vec![
            identity_node("a").into(),
            identity_node("b").into(),
        ])
        .unwrap()
        .into(),
    ])
    .unwrap();

    let ids = GraphValue::Chain(chain).ids();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[test]
fn incorporation_regenerates_ids_and_leaves_the_source_untouched() {
    let source = identity_node("src");
    let source_id = source.id();

    let chain = Chain::new(vec![
        source.clone().into(),
        identity_node("next").into(),
    ])
    .unwrap();

    // Source keeps its identity; the incorporated copy got a fresh one.
    assert_eq!(source.id(), source_id);
    let chain_ids: HashSet<_> = GraphValue::Chain(chain).ids().into_iter().collect();
    assert!(!chain_ids.contains(&source_id));
}

#[test]
fn refreshed_copies_share_names_but_not_ids() {
    let chain = Chain::new(vec![
        identity_node("f").into(),
        identity_node("g").into(),
    ])
    .unwrap();
    let value = GraphValue::Chain(chain);
    let copy = value.refreshed();

    assert_eq!(value.name(), copy.name());
    let original: HashSet<_> = value.ids().into_iter().collect();
    let refreshed: HashSet<_> = copy.ids().into_iter().collect();
    assert!(original.is_disjoint(&refreshed));
}

#[test]
fn conditional_branches_are_detached_copies() {
    let branch = identity_node("branch");
    let branch_id = branch.id();
    let cond = ConditionalNode::new(
        non_negative_predicate("check"),
        branch.clone(),
        identity_node("other"),
    );

    assert_eq!(branch.id(), branch_id);
    assert_ne!(cond.true_branch().id(), branch_id);
    assert_eq!(cond.true_branch().name(), "branch");
}

#[test]
fn display_renders_a_json_repr() {
    let node = identity_node("shown");
    let repr = format!("{node}");
    assert!(repr.starts_with("Node({"));
    assert!(repr.contains("\"name\":\"shown\""));
    assert!(repr.contains(&node.id().to_string()));
    // The declared signature is serialized into the repr.
    assert!(repr.contains("\"parameters\":[\"x\"]"));
    assert!(repr.contains("\"variadic\":false"));

    let layer = Layer::new(vec![
        identity_node("a").into(),
        identity_node("b").into(),
    ])
    .unwrap();
    assert!(format!("{layer}").starts_with("Layer({"));
}

#[test]
fn layer_children_expose_submission_order() {
    let layer = Layer::new(vec![
        identity_node("first").into(),
        identity_node("second").into(),
        identity_node("third").into(),
    ])
    .unwrap();
    let names: Vec<_> = layer
        .children()
        .values()
        .into_iter()
        .map(GraphValue::name)
        .collect();
    assert_eq!(names, ["first", "second", "third"]);
    assert_eq!(layer.children().len(), 3);
    assert!(matches!(layer.children(), LayerChildren::Ordered(_)));
}
