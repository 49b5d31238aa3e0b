//! The graph data model: the four composable unit kinds and their
//! identity/ownership rules.
//!
//! A graph value is one of exactly four kinds ([`Node`],
//! [`ConditionalNode`], [`Layer`], [`Chain`]), closed over by the
//! [`GraphValue`] enum. Every value carries a globally unique id and a
//! display name, and every incorporation into a new structure deep-copies
//! the incorporated tree and regenerates every id inside the copy, so no
//! two live structures ever share an identity. Names propagate through
//! copies unchanged.

use std::fmt;

use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::callable::Callable;

/// Separator joining child names into a derived chain name.
pub const SEQUENTIAL_SEPARATOR: &str = " -> ";
/// Separator joining child names into a derived layer name.
pub const PARALLEL_SEPARATOR: &str = " | ";

// ============================================================================
// Errors
// ============================================================================

/// Malformed graph construction or a branch predicate gone wrong.
///
/// Raised synchronously at construction time, or at the exact invocation
/// step for [`PredicateNotBoolean`](Self::PredicateNotBoolean); never
/// deferred. A failed construction leaves no partially built entity behind.
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    /// A chain was constructed with fewer than two children.
    #[error("a chain needs at least two nodes, got {got}")]
    #[diagnostic(
        code(streamgraph::graph::chain_arity),
        help("Wrap a single node directly instead of chaining it alone.")
    )]
    ChainTooShort { got: usize },

    /// A layer was constructed with another layer as a direct child.
    #[error("layers cannot contain other layers (offending child: {name})")]
    #[diagnostic(
        code(streamgraph::graph::nested_layer),
        help("Wrap the inner layer in a chain before nesting it.")
    )]
    NestedLayer { name: String },

    /// A conditional predicate produced something other than a boolean.
    #[error("predicate {name} must return a boolean, got {got}")]
    #[diagnostic(
        code(streamgraph::graph::predicate_not_boolean),
        help("Conditional nodes route on `true`/`false` only.")
    )]
    PredicateNotBoolean { name: String, got: &'static str },
}

// ============================================================================
// Leaf nodes
// ============================================================================

/// A leaf unit wrapping one callable.
///
/// The display name defaults to the callable's declared name and the
/// description to its doc string; both can be overridden.
///
/// # Examples
///
/// ```
/// use streamgraph::callable::{Callable, Signature};
/// use streamgraph::graph::Node;
/// use serde_json::json;
///
/// let node = Node::new(Callable::new(
///     Signature::new("greet", ["who"]).with_doc("Say hello."),
///     |args| Ok(json!(format!("hello {}", args.named["who"]))),
/// ));
/// assert_eq!(node.name(), "greet");
/// assert_eq!(node.description(), Some("Say hello."));
/// ```
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: Uuid,
    name: String,
    description: Option<String>,
    callable: Callable,
}

impl Node {
    /// Wrap a callable as a graph node.
    pub fn new(callable: Callable) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: callable.signature().name().to_string(),
            description: callable.signature().doc().map(str::to_string),
            callable,
        }
    }

    /// Override the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Ordered parameter names, variadic markers included.
    pub fn parameters(&self) -> &[String] {
        self.callable.signature().parameters()
    }

    /// True when call arguments bypass the argument mapper.
    pub fn accepts_variadic(&self) -> bool {
        self.callable.signature().accepts_variadic()
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = json!({
            "id": self.id.to_string(),
            "signature": self.callable.signature(),
            "name": self.name,
            "description": self.description,
        });
        write!(f, "Node({repr})")
    }
}

/// A node whose callable must return a boolean, routing to one of two
/// exclusively owned branches.
///
/// Both branches are deep-copied with fresh identities at construction;
/// the values passed in are never aliased into the new structure.
#[derive(Clone, Debug)]
pub struct ConditionalNode {
    pub(crate) id: Uuid,
    name: String,
    description: Option<String>,
    callable: Callable,
    true_branch: Box<GraphValue>,
    false_branch: Box<GraphValue>,
}

impl ConditionalNode {
    /// Wrap a boolean-returning callable with its two branches.
    pub fn new(
        callable: Callable,
        true_branch: impl Into<GraphValue>,
        false_branch: impl Into<GraphValue>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: callable.signature().name().to_string(),
            description: callable.signature().doc().map(str::to_string),
            callable,
            true_branch: Box::new(true_branch.into().refreshed()),
            false_branch: Box::new(false_branch.into().refreshed()),
        }
    }

    /// Override the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        self.callable.signature().parameters()
    }

    pub fn accepts_variadic(&self) -> bool {
        self.callable.signature().accepts_variadic()
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// The branch invoked when the predicate returns `true`.
    pub fn true_branch(&self) -> &GraphValue {
        &self.true_branch
    }

    /// The branch invoked when the predicate returns `false`.
    pub fn false_branch(&self) -> &GraphValue {
        &self.false_branch
    }
}

impl fmt::Display for ConditionalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = json!({
            "id": self.id.to_string(),
            "signature": self.callable.signature(),
            "name": self.name,
            "description": self.description,
        });
        write!(f, "ConditionalNode({repr})")
    }
}

// ============================================================================
// Composite nodes
// ============================================================================

/// A layer's children: either an ordered sequence or a string-keyed
/// mapping.
///
/// The variant determines the shape of invocation results: ordered input
/// produces an ordered array, named input produces a keyed object. Named
/// children keep their insertion order so lowering stays deterministic.
#[derive(Clone, Debug)]
pub enum LayerChildren {
    Ordered(Vec<GraphValue>),
    Named(Vec<(String, GraphValue)>),
}

impl LayerChildren {
    pub fn len(&self) -> usize {
        match self {
            LayerChildren::Ordered(items) => items.len(),
            LayerChildren::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, LayerChildren::Named(_))
    }

    /// Child values in submission order.
    pub fn values(&self) -> Vec<&GraphValue> {
        match self {
            LayerChildren::Ordered(items) => items.iter().collect(),
            LayerChildren::Named(pairs) => pairs.iter().map(|(_, v)| v).collect(),
        }
    }

    fn values_mut(&mut self) -> Vec<&mut GraphValue> {
        match self {
            LayerChildren::Ordered(items) => items.iter_mut().collect(),
            LayerChildren::Named(pairs) => pairs.iter_mut().map(|(_, v)| v).collect(),
        }
    }
}

/// A collection of sibling graph values invoked concurrently with the same
/// call arguments.
///
/// Layers do not nest directly; a layer containing another layer must wrap
/// the inner one in a chain first, enforced at construction.
#[derive(Clone, Debug)]
pub struct Layer {
    pub(crate) id: Uuid,
    name: String,
    description: Option<String>,
    children: LayerChildren,
}

impl Layer {
    /// Build a layer over an ordered sequence of children.
    ///
    /// Fails with [`ValidationError::NestedLayer`] if any child is itself a
    /// layer. All children are copied in with fresh identities.
    pub fn new(children: Vec<GraphValue>) -> Result<Self, ValidationError> {
        Self::build(LayerChildren::Ordered(children))
    }

    /// Build a layer over a string-keyed mapping of children.
    ///
    /// Invocation results are keyed identically; key insertion order is
    /// preserved for lowering.
    pub fn named(pairs: Vec<(String, GraphValue)>) -> Result<Self, ValidationError> {
        Self::build(LayerChildren::Named(pairs))
    }

    fn build(children: LayerChildren) -> Result<Self, ValidationError> {
        let mut children = children;
        if let Some(nested) = children
            .values()
            .into_iter()
            .find(|child| matches!(child, GraphValue::Layer(_)))
        {
            return Err(ValidationError::NestedLayer {
                name: nested.name().to_string(),
            });
        }
        for child in children.values_mut() {
            child.refresh_ids();
        }
        let name = children
            .values()
            .iter()
            .map(|child| child.name())
            .collect::<Vec<_>>()
            .join(PARALLEL_SEPARATOR);
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            children,
        })
    }

    /// Override the derived display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn children(&self) -> &LayerChildren {
        &self.children
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = json!({
            "id": self.id.to_string(),
            "name": self.name,
            "description": self.description,
        });
        write!(f, "Layer({repr})")
    }
}

/// An ordered sequence of at least two sibling graph values invoked in
/// sequence, each step fed from the previous step's result.
#[derive(Clone, Debug)]
pub struct Chain {
    pub(crate) id: Uuid,
    name: String,
    description: Option<String>,
    children: Vec<GraphValue>,
}

impl Chain {
    /// Build a chain over ordered children.
    ///
    /// Fails with [`ValidationError::ChainTooShort`] for fewer than two
    /// children. All children are copied in with fresh identities.
    pub fn new(children: Vec<GraphValue>) -> Result<Self, ValidationError> {
        if children.len() < 2 {
            return Err(ValidationError::ChainTooShort {
                got: children.len(),
            });
        }
        let mut children = children;
        for child in &mut children {
            child.refresh_ids();
        }
        let name = children
            .iter()
            .map(|child| child.name())
            .collect::<Vec<_>>()
            .join(SEQUENTIAL_SEPARATOR);
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            children,
        })
    }

    /// Override the derived display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn children(&self) -> &[GraphValue] {
        &self.children
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = json!({
            "id": self.id.to_string(),
            "name": self.name,
            "description": self.description,
        });
        write!(f, "Chain({repr})")
    }
}

// ============================================================================
// The closed graph-value enum
// ============================================================================

/// Any of the four composable unit kinds.
///
/// The set of kinds is closed: execution and diagram lowering match
/// exhaustively over these four variants and are never extended at
/// runtime.
#[derive(Clone, Debug)]
pub enum GraphValue {
    Node(Node),
    Conditional(ConditionalNode),
    Layer(Layer),
    Chain(Chain),
}

impl GraphValue {
    /// The unique identifier of the outermost unit.
    pub fn id(&self) -> Uuid {
        match self {
            GraphValue::Node(n) => n.id,
            GraphValue::Conditional(c) => c.id,
            GraphValue::Layer(l) => l.id,
            GraphValue::Chain(c) => c.id,
        }
    }

    /// The display name of the outermost unit.
    pub fn name(&self) -> &str {
        match self {
            GraphValue::Node(n) => n.name(),
            GraphValue::Conditional(c) => c.name(),
            GraphValue::Layer(l) => l.name(),
            GraphValue::Chain(c) => c.name(),
        }
    }

    /// Number of children a composition operator would splice in: a
    /// chain's child count, 1 for everything else.
    pub fn child_count(&self) -> usize {
        match self {
            GraphValue::Chain(c) => c.children().len(),
            _ => 1,
        }
    }

    /// Every unique identifier in the nested structure, preorder.
    pub fn ids(&self) -> Vec<Uuid> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<Uuid>) {
        out.push(self.id());
        match self {
            GraphValue::Node(_) => {}
            GraphValue::Conditional(c) => {
                c.true_branch.collect_ids(out);
                c.false_branch.collect_ids(out);
            }
            GraphValue::Layer(l) => {
                for child in l.children.values() {
                    child.collect_ids(out);
                }
            }
            GraphValue::Chain(c) => {
                for child in &c.children {
                    child.collect_ids(out);
                }
            }
        }
    }

    /// An independent, fully detached copy with every identifier
    /// regenerated, recursively. Names are untouched.
    #[must_use]
    pub fn refreshed(&self) -> Self {
        let mut copy = self.clone();
        copy.refresh_ids();
        copy
    }

    pub(crate) fn refresh_ids(&mut self) {
        match self {
            GraphValue::Node(n) => n.id = Uuid::new_v4(),
            GraphValue::Conditional(c) => {
                c.id = Uuid::new_v4();
                c.true_branch.refresh_ids();
                c.false_branch.refresh_ids();
            }
            GraphValue::Layer(l) => {
                l.id = Uuid::new_v4();
                for child in l.children.values_mut() {
                    child.refresh_ids();
                }
            }
            GraphValue::Chain(c) => {
                c.id = Uuid::new_v4();
                for child in &mut c.children {
                    child.refresh_ids();
                }
            }
        }
    }
}

impl fmt::Display for GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphValue::Node(n) => n.fmt(f),
            GraphValue::Conditional(c) => c.fmt(f),
            GraphValue::Layer(l) => l.fmt(f),
            GraphValue::Chain(c) => c.fmt(f),
        }
    }
}

impl From<Node> for GraphValue {
    fn from(node: Node) -> Self {
        GraphValue::Node(node)
    }
}

impl From<ConditionalNode> for GraphValue {
    fn from(node: ConditionalNode) -> Self {
        GraphValue::Conditional(node)
    }
}

impl From<Layer> for GraphValue {
    fn from(layer: Layer) -> Self {
        GraphValue::Layer(layer)
    }
}

impl From<Chain> for GraphValue {
    fn from(chain: Chain) -> Self {
        GraphValue::Chain(chain)
    }
}
