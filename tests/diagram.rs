mod common;

use common::*;
use streamgraph::compose::Compose;
use streamgraph::diagram::{Direction, MERMAID_CLASS_DEFS, lower};
use streamgraph::graph::{Chain, ConditionalNode, GraphValue, Layer};

fn unit(value: &GraphValue) -> String {
    value.id().simple().to_string()
}

#[test]
fn a_single_node_lowers_to_one_rectangle_and_no_edges() {
    let node = GraphValue::from(identity_node("only"));
    let lowering = lower([&node]);

    assert_eq!(lowering.lines, vec![format!("{}[only]:::rectangle;", unit(&node))]);
    assert_eq!(lowering.entries, vec![node.id()]);
    assert_eq!(lowering.exits, vec![node.id()]);
}

#[test]
fn a_two_step_chain_lowers_to_two_declarations_and_one_edge() {
    let chain = identity_node("f").then(identity_node("g")).unwrap();
    let f = &chain.children()[0];
    let g = &chain.children()[1];
    let value = GraphValue::from(chain.clone());
    let lowering = lower([&value]);

    assert_eq!(
        lowering.lines,
        vec![
            "subgraph \" \";".to_string(),
            format!("{}[f]:::rectangle;", unit(f)),
            format!("{}[g]:::rectangle;", unit(g)),
            format!("{} --> {};", unit(f), unit(g)),
            "end;".to_string(),
        ]
    );
    assert_eq!(lowering.entries, vec![f.id()]);
    assert_eq!(lowering.exits, vec![g.id()]);
}

#[test]
fn sequential_nodes_wire_through_the_running_frontier() {
    let chain = identity_node("a")
        .then(identity_node("b"))
        .unwrap()
        .then(identity_node("c"))
        .unwrap();
    let lowering = lower(chain.children().iter());

    let declarations = lowering.lines.iter().filter(|l| l.contains(":::rectangle")).count();
    let edges = lowering.lines.iter().filter(|l| l.contains("-->")).count();
    assert_eq!(declarations, 3);
    assert_eq!(edges, 2);
}

#[test]
fn layers_union_their_children_frontiers() {
    let chain = identity_node("src")
        .then(vec![identity_node("a"), identity_node("b")])
        .unwrap();
    let src = &chain.children()[0];
    let GraphValue::Layer(layer) = &chain.children()[1] else {
        panic!("expected a layer");
    };
    let members = layer.children().values();

    let lowering = lower(chain.children().iter());

    // One edge from the source into each layer member.
    for member in &members {
        assert!(lowering
            .lines
            .contains(&format!("{} --> {};", unit(src), member.id().simple())));
    }
    // The layer's exits stay live as the chain's exit frontier.
    assert_eq!(
        lowering.exits,
        members.iter().map(|m| m.id()).collect::<Vec<_>>()
    );
    assert_eq!(lowering.entries, vec![src.id()]);
}

#[test]
fn conditionals_emit_labeled_edges_and_merge_branch_exits() {
    let cond = ConditionalNode::new(
        non_negative_predicate("check"),
        identity_node("yes"),
        identity_node("no"),
    );
    let value = GraphValue::from(cond.clone());
    let lowering = lower([&value]);

    let diamond = format!("{}{{check}}:::diamond;", unit(&value));
    assert!(lowering.lines.contains(&diamond));
    assert!(lowering.lines.contains(&format!(
        "{} -- True --> {};",
        unit(&value),
        cond.true_branch().id().simple()
    )));
    assert!(lowering.lines.contains(&format!(
        "{} -- False --> {};",
        unit(&value),
        cond.false_branch().id().simple()
    )));

    // Both branch frontiers survive, false branch first.
    assert_eq!(
        lowering.exits,
        vec![cond.false_branch().id(), cond.true_branch().id()]
    );
    assert_eq!(lowering.entries, vec![value.id()]);
}

#[test]
fn chain_branches_of_a_conditional_are_wrapped_in_subgraphs() {
    let true_branch = identity_node("t1").then(identity_node("t2")).unwrap();
    let cond = ConditionalNode::new(
        non_negative_predicate("check"),
        true_branch,
        identity_node("no"),
    );
    let value = GraphValue::from(cond);
    let lowering = lower([&value]);

    let opens = lowering.lines.iter().filter(|l| l.starts_with("subgraph")).count();
    let closes = lowering.lines.iter().filter(|l| *l == "end;").count();
    assert_eq!(opens, 1);
    assert_eq!(closes, 1);
}

#[test]
fn a_node_feeding_a_conditional_gets_an_incoming_edge() {
    let cond = ConditionalNode::new(
        non_negative_predicate("check"),
        identity_node("yes"),
        identity_node("no"),
    );
    let chain = Chain::new(vec![
        identity_node("src").into(),
        GraphValue::Conditional(cond),
    ])
    .unwrap();
    let src = &chain.children()[0];
    let cond = &chain.children()[1];

    let lowering = lower(chain.children().iter());
    assert!(lowering
        .lines
        .contains(&format!("{} --> {};", unit(src), unit(cond))));
}

#[test]
fn lowering_is_idempotent_for_the_same_tree() {
    let chain = identity_node("a")
        .then(vec![identity_node("b"), identity_node("c")])
        .unwrap()
        .then(identity_node("d"))
        .unwrap();
    let first = lower(chain.children().iter());
    let second = lower(chain.children().iter());
    assert_eq!(first.lines, second.lines);
    assert_eq!(first.entries, second.entries);
    assert_eq!(first.exits, second.exits);
}

#[test]
fn mermaid_source_carries_header_and_style_preamble() {
    let chain = identity_node("f").then(identity_node("g")).unwrap();
    let source = chain.mermaid_source(Direction::LeftRight);

    assert!(source.starts_with("flowchart LR;\n"));
    assert!(source.ends_with(MERMAID_CLASS_DEFS));
    assert!(source.contains(":::rectangle;"));

    // The enum wrapper renders identically.
    assert_eq!(
        GraphValue::from(chain.clone()).mermaid_source(Direction::LeftRight),
        source
    );
}

#[test]
fn separately_built_trees_differ_only_in_identifiers() {
    let build = || {
        identity_node("f")
            .then(identity_node("g"))
            .unwrap()
            .mermaid_source(Direction::TopBottom)
    };
    let a = build();
    let b = build();
    assert_ne!(a, b);
    assert_eq!(a.len(), b.len());

    let nested_layer = Layer::new(vec![
        identity_node("x").into(),
        identity_node("y").into(),
    ])
    .unwrap();
    // Lowering a layer directly exposes each member as entry and exit.
    let value = GraphValue::from(nested_layer);
    let lowering = lower([&value]);
    assert_eq!(lowering.entries.len(), 2);
    assert_eq!(lowering.exits.len(), 2);
}
