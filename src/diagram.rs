//! Diagram lowering: recursively walk a graph value and produce mermaid
//! flowchart statements plus the entry/exit frontiers needed to embed the
//! result inside a larger diagram.
//!
//! The frontier bookkeeping is the intricate part. Each recursion level
//! carries a running `previous_exit` set; the entry set is fixed by the
//! first child processed and never reassigned, while the exit set always
//! equals the frontier left behind by the last child. Conditional and
//! layer children contribute *unions* of their branch/child frontiers, so
//! edges wire correctly through nested parallel and branching structure.

use uuid::Uuid;

use crate::graph::{Chain, GraphValue};

/// Fixed style-class preamble appended to every generated diagram.
pub const MERMAID_CLASS_DEFS: &str = "

classDef rectangle fill:#89CFF0,stroke:#003366,stroke-width:2px;
classDef diamond fill:#98FB98,stroke:#2E8B57,stroke-width:2px,stroke-dasharray: 5;
classDef diamond_loop fill:#DDA0DD,stroke:#8A2BE2,stroke-width:2px,stroke-dasharray: 5;
";

const SUBGRAPH_OPEN: &str = "subgraph \" \";";
const SUBGRAPH_CLOSE: &str = "end;";

/// Layout direction for a rendered flowchart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Top to bottom (mermaid `TB`).
    #[default]
    TopBottom,
    /// Bottom to top (mermaid `BT`).
    BottomTop,
    /// Left to right (mermaid `LR`).
    LeftRight,
    /// Right to left (mermaid `RL`).
    RightLeft,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

/// The result of lowering a sequence of graph values.
#[derive(Clone, Debug, Default)]
pub struct Lowering {
    /// Units the caller wires incoming edges to.
    pub entries: Vec<Uuid>,
    /// Ordered diagram statements: declarations, edges, subgraph brackets.
    pub lines: Vec<String>,
    /// Units the caller wires outgoing edges from.
    pub exits: Vec<Uuid>,
}

fn unit(id: Uuid) -> String {
    id.simple().to_string()
}

fn edge(from: Uuid, to: Uuid) -> String {
    format!("{} --> {};", unit(from), unit(to))
}

fn labeled_edge(from: Uuid, label: &str, to: Uuid) -> String {
    format!("{} -- {} --> {};", unit(from), label, unit(to))
}

/// The children a branch or layer member contributes to a sub-lowering:
/// composite values expose their own children, leaves stand alone.
fn sub_nodes(value: &GraphValue) -> Vec<&GraphValue> {
    match value {
        GraphValue::Chain(chain) => chain.children().iter().collect(),
        GraphValue::Layer(layer) => layer.children().values(),
        leaf => vec![leaf],
    }
}

/// Lower an ordered sequence of graph values into diagram statements.
///
/// The same input tree always produces the same statement ordering;
/// identifier values differ between separately constructed trees because
/// of the identity invariant.
pub fn lower<'a>(nodes: impl IntoIterator<Item = &'a GraphValue>) -> Lowering {
    let mut lines: Vec<String> = Vec::new();
    let mut entries: Option<Vec<Uuid>> = None;
    let mut previous_exit: Option<Vec<Uuid>> = None;

    for node in nodes {
        match node {
            GraphValue::Node(n) => {
                lines.push(format!("{}[{}]:::rectangle;", unit(n.id()), n.name()));
                if entries.is_none() {
                    entries = Some(vec![n.id()]);
                }
                if let Some(prev) = &previous_exit {
                    for from in prev {
                        lines.push(edge(*from, n.id()));
                    }
                }
                previous_exit = Some(vec![n.id()]);
            }
            GraphValue::Conditional(cond) => {
                lines.push(format!("{}{{{}}}:::diamond;", unit(cond.id()), cond.name()));

                let lowered_true = lower(sub_nodes(cond.true_branch()));
                let lowered_false = lower(sub_nodes(cond.false_branch()));

                for to in &lowered_true.entries {
                    lines.push(labeled_edge(cond.id(), "True", *to));
                }
                for to in &lowered_false.entries {
                    lines.push(labeled_edge(cond.id(), "False", *to));
                }

                if matches!(cond.true_branch(), GraphValue::Chain(_)) {
                    lines.push(SUBGRAPH_OPEN.to_string());
                    lines.extend(lowered_true.lines);
                    lines.push(SUBGRAPH_CLOSE.to_string());
                } else {
                    lines.extend(lowered_true.lines);
                }
                if matches!(cond.false_branch(), GraphValue::Chain(_)) {
                    lines.push(SUBGRAPH_OPEN.to_string());
                    lines.extend(lowered_false.lines);
                    lines.push(SUBGRAPH_CLOSE.to_string());
                } else {
                    lines.extend(lowered_false.lines);
                }

                if let Some(prev) = &previous_exit {
                    for from in prev {
                        lines.push(edge(*from, cond.id()));
                    }
                }
                if entries.is_none() {
                    entries = Some(vec![cond.id()]);
                }
                // Both branch frontiers stay live past the conditional.
                let mut exits = lowered_false.exits;
                exits.extend(lowered_true.exits);
                previous_exit = Some(exits);
            }
            GraphValue::Layer(layer) => {
                let children = layer.children().values();
                let parts: Vec<Lowering> =
                    children.iter().map(|child| lower(sub_nodes(child))).collect();

                for (child, part) in children.iter().zip(&parts) {
                    if matches!(child, GraphValue::Chain(_)) {
                        lines.push(SUBGRAPH_OPEN.to_string());
                        lines.extend(part.lines.iter().cloned());
                        lines.push(SUBGRAPH_CLOSE.to_string());
                    } else {
                        lines.extend(part.lines.iter().cloned());
                    }
                }

                let entry_union: Vec<Uuid> = parts
                    .iter()
                    .flat_map(|part| part.entries.iter().copied())
                    .collect();
                if entries.is_none() {
                    entries = Some(entry_union.clone());
                }
                if let Some(prev) = &previous_exit {
                    for from in prev {
                        for to in &entry_union {
                            lines.push(edge(*from, *to));
                        }
                    }
                }
                previous_exit = Some(
                    parts
                        .iter()
                        .flat_map(|part| part.exits.iter().copied())
                        .collect(),
                );
            }
            GraphValue::Chain(chain) => {
                let sub = lower(chain.children());

                lines.push(SUBGRAPH_OPEN.to_string());
                lines.extend(sub.lines);
                lines.push(SUBGRAPH_CLOSE.to_string());

                if entries.is_none() {
                    entries = Some(sub.entries.clone());
                }
                if let Some(prev) = &previous_exit {
                    for from in prev {
                        for to in &sub.entries {
                            lines.push(edge(*from, *to));
                        }
                    }
                }
                previous_exit = Some(sub.exits);
            }
        }
    }

    Lowering {
        entries: entries.unwrap_or_default(),
        lines,
        exits: previous_exit.unwrap_or_default(),
    }
}

impl GraphValue {
    /// Render this graph value as a complete mermaid flowchart source.
    ///
    /// Composite values are lowered through their own children so the
    /// outermost structure is not wrapped in a redundant subgraph; a leaf
    /// lowers to a single declaration.
    pub fn mermaid_source(&self, direction: Direction) -> String {
        let lowering = lower(sub_nodes(self));
        format!(
            "flowchart {};\n{}{}",
            direction.as_str(),
            lowering.lines.join("\n"),
            MERMAID_CLASS_DEFS
        )
    }
}

impl Chain {
    /// Render this chain as a complete mermaid flowchart source.
    pub fn mermaid_source(&self, direction: Direction) -> String {
        let lowering = lower(self.children());
        format!(
            "flowchart {};\n{}{}",
            direction.as_str(),
            lowering.lines.join("\n"),
            MERMAID_CLASS_DEFS
        )
    }
}
