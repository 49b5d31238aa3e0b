//! Composition operators that build new chains from existing graph values
//! without mutating them.
//!
//! [`combine`] is the single entry point; the [`Compose`] trait layers the
//! ergonomic `then`/`precede` forms on top of it. Raw sequences and
//! mappings of graph values are wrapped into layers before splicing, so
//! `a.then(vec![b, c])` fans out through a fresh layer.

use crate::graph::{Chain, ConditionalNode, GraphValue, Layer, Node, ValidationError};

/// The right-hand side of a composition: a single graph value, an ordered
/// sequence, or a string-keyed mapping, nested arbitrarily.
///
/// Sequences and mappings are converted to [`Layer`]s recursively; a
/// sequence nested directly inside another sequence therefore fails with
/// [`ValidationError::NestedLayer`], same as constructing the layers by
/// hand.
#[derive(Clone, Debug)]
pub enum Operand {
    Value(GraphValue),
    Seq(Vec<Operand>),
    Map(Vec<(String, Operand)>),
}

impl Operand {
    /// An ordered sequence operand, fanned out through a layer.
    pub fn seq(items: impl IntoIterator<Item = impl Into<Operand>>) -> Self {
        Operand::Seq(items.into_iter().map(Into::into).collect())
    }

    /// A string-keyed mapping operand, fanned out through a named layer.
    pub fn map(
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<Operand>)>,
    ) -> Self {
        Operand::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Collapse the operand into a single graph value, wrapping raw
    /// collections into layers.
    pub fn into_graph_value(self) -> Result<GraphValue, ValidationError> {
        match self {
            Operand::Value(value) => Ok(value),
            Operand::Seq(items) => {
                let children = items
                    .into_iter()
                    .map(Operand::into_graph_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GraphValue::Layer(Layer::new(children)?))
            }
            Operand::Map(pairs) => {
                let children = pairs
                    .into_iter()
                    .map(|(key, operand)| Ok((key, operand.into_graph_value()?)))
                    .collect::<Result<Vec<_>, ValidationError>>()?;
                Ok(GraphValue::Layer(Layer::named(children)?))
            }
        }
    }
}

impl From<GraphValue> for Operand {
    fn from(value: GraphValue) -> Self {
        Operand::Value(value)
    }
}

impl From<Node> for Operand {
    fn from(node: Node) -> Self {
        Operand::Value(node.into())
    }
}

impl From<ConditionalNode> for Operand {
    fn from(node: ConditionalNode) -> Self {
        Operand::Value(node.into())
    }
}

impl From<Layer> for Operand {
    fn from(layer: Layer) -> Self {
        Operand::Value(layer.into())
    }
}

impl From<Chain> for Operand {
    fn from(chain: Chain) -> Self {
        Operand::Value(chain.into())
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand>, const N: usize> From<[T; N]> for Operand {
    fn from(items: [T; N]) -> Self {
        Operand::Seq(items.into_iter().map(Into::into).collect())
    }
}

/// Combine two graph values into a new chain.
///
/// When `left` is already a chain, `right` is spliced onto the front or
/// back of its child sequence instead of nesting a chain inside a chain.
/// Every child of the result is a fresh-identity copy; neither operand is
/// mutated.
pub fn combine(
    left: &GraphValue,
    right: impl Into<Operand>,
    insert_before: bool,
) -> Result<Chain, ValidationError> {
    let right = right.into().into_graph_value()?;
    let children = match left {
        GraphValue::Chain(chain) => {
            let mut children = Vec::with_capacity(chain.children().len() + 1);
            if insert_before {
                children.push(right);
                children.extend(chain.children().iter().cloned());
            } else {
                children.extend(chain.children().iter().cloned());
                children.push(right);
            }
            children
        }
        other => {
            if insert_before {
                vec![right, other.clone()]
            } else {
                vec![other.clone(), right]
            }
        }
    };
    Chain::new(children)
}

/// Ergonomic composition forms, implemented for every graph value kind.
///
/// # Examples
///
/// ```
/// use streamgraph::callable::{Callable, Signature};
/// use streamgraph::compose::Compose;
/// use streamgraph::graph::Node;
/// use serde_json::json;
///
/// let f = Node::new(Callable::new(Signature::new("f", ["x"]), |_| Ok(json!(1))));
/// let g = Node::new(Callable::new(Signature::new("g", ["x"]), |_| Ok(json!(2))));
/// let chain = f.then(g).unwrap();
/// assert_eq!(chain.children().len(), 2);
/// assert_eq!(chain.name(), "f -> g");
/// ```
pub trait Compose {
    /// This value as a detached [`GraphValue`].
    fn as_graph_value(&self) -> GraphValue;

    /// Extend after: a new chain running `self` first, then `other`.
    fn then(&self, other: impl Into<Operand>) -> Result<Chain, ValidationError> {
        combine(&self.as_graph_value(), other, false)
    }

    /// Extend before: a new chain running `other` first, then `self`.
    fn precede(&self, other: impl Into<Operand>) -> Result<Chain, ValidationError> {
        combine(&self.as_graph_value(), other, true)
    }
}

impl Compose for GraphValue {
    fn as_graph_value(&self) -> GraphValue {
        self.clone()
    }
}

impl Compose for Node {
    fn as_graph_value(&self) -> GraphValue {
        GraphValue::Node(self.clone())
    }
}

impl Compose for ConditionalNode {
    fn as_graph_value(&self) -> GraphValue {
        GraphValue::Conditional(self.clone())
    }
}

impl Compose for Layer {
    fn as_graph_value(&self) -> GraphValue {
        GraphValue::Layer(self.clone())
    }
}

impl Compose for Chain {
    fn as_graph_value(&self) -> GraphValue {
        GraphValue::Chain(self.clone())
    }
}
