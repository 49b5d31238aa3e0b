//! # Streamgraph: Function-Composition Computation Graphs
//!
//! Streamgraph lets you compose plain functions into a directed computation
//! graph of sequential chains, concurrent fan-out layers, and boolean
//! branch points, execute that graph against runtime arguments, and lower
//! it into a mermaid flow diagram.
//!
//! ## Core Concepts
//!
//! - **Node**: one callable plus its declared [`Signature`](callable::Signature)
//! - **ConditionalNode**: a boolean predicate routing to two owned branches
//! - **Layer**: siblings invoked concurrently with the same arguments
//! - **Chain**: siblings invoked in sequence, each fed from the last result
//! - **Identity invariant**: every incorporation into a new structure
//!   deep-copies the tree and regenerates every id inside the copy
//!
//! ## Quick Start
//!
//! ```
//! use streamgraph::args::CallArgs;
//! use streamgraph::callable::{Callable, Signature};
//! use streamgraph::compose::Compose;
//! use streamgraph::graph::Node;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let double = Node::new(Callable::new(Signature::new("double", ["x"]), |args| {
//!     Ok(json!(args.named["x"].as_i64().unwrap_or(0) * 2))
//! }));
//! let inc = Node::new(Callable::new(Signature::new("inc", ["x"]), |args| {
//!     Ok(json!(args.named["x"].as_i64().unwrap_or(0) + 1))
//! }));
//!
//! // Composition never mutates its operands.
//! let chain = double.then(inc)?;
//! let out = chain.invoke(CallArgs::positional([json!(3)])).await?;
//! assert_eq!(out, json!(7));
//! # Ok(())
//! # }
//! ```
//!
//! ## Diagrams
//!
//! ```
//! use streamgraph::callable::{Callable, Signature};
//! use streamgraph::compose::Compose;
//! use streamgraph::diagram::Direction;
//! use streamgraph::graph::Node;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = Node::new(Callable::new(Signature::new("a", ["x"]), |_| Ok(json!(1))));
//! let b = Node::new(Callable::new(Signature::new("b", ["x"]), |_| Ok(json!(2))));
//! let source = a.then(b)?.mermaid_source(Direction::TopBottom);
//! assert!(source.starts_with("flowchart TB;"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`args`] - Call arguments and the argument mapper
//! - [`callable`] - The caller-supplied function adapter boundary
//! - [`graph`] - The four entity kinds and identity rules
//! - [`compose`] - `then`/`precede` composition operators
//! - [`exec`] - Sequential, concurrent, and conditional execution
//! - [`diagram`] - Lowering to mermaid flowchart statements
//! - [`render`] - Remote image rendering of lowered diagrams
//! - [`telemetry`] - Tracing subscriber setup

pub mod args;
pub mod callable;
pub mod compose;
pub mod diagram;
pub mod exec;
pub mod graph;
pub mod render;
pub mod telemetry;
