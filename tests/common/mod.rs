#![allow(dead_code)]

use serde_json::{Value, json};
use streamgraph::callable::{CallError, Callable, Signature};
use streamgraph::graph::Node;

/// A node over `x` that returns its input unchanged.
pub fn identity_node(name: &str) -> Node {
    Node::new(Callable::new(Signature::new(name, ["x"]), |args| {
        Ok(args.named.get("x").cloned().unwrap_or(Value::Null))
    }))
}

/// A node over `x` that adds a constant.
pub fn add_node(name: &str, delta: i64) -> Node {
    Node::new(Callable::new(Signature::new(name, ["x"]), move |args| {
        let x = args.named.get("x").and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(x + delta))
    }))
}

/// A node over `x` that multiplies by a constant.
pub fn mul_node(name: &str, factor: i64) -> Node {
    Node::new(Callable::new(Signature::new(name, ["x"]), move |args| {
        let x = args.named.get("x").and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(x * factor))
    }))
}

/// A node ignoring its arguments and returning a fixed value.
pub fn const_node(name: &str, value: Value) -> Node {
    Node::new(Callable::new(Signature::new(name, ["x"]), move |_| {
        Ok(value.clone())
    }))
}

/// A node over `x` that always fails.
pub fn failing_node(name: &str) -> Node {
    Node::new(Callable::new(Signature::new(name, ["x"]), |_| {
        Err(CallError::msg("boom"))
    }))
}

/// A predicate node over `x` returning `x >= 0`.
pub fn non_negative_predicate(name: &str) -> Callable {
    Callable::new(Signature::new(name, ["x"]), |args| {
        let x = args.named.get("x").and_then(Value::as_i64).unwrap_or(0);
        Ok(json!(x >= 0))
    })
}
