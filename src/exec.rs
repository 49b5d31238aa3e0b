//! The execution engine.
//!
//! Invocation recurses over the closed [`GraphValue`] enum: nodes map
//! their call arguments and run their callable, conditional nodes evaluate
//! a boolean predicate and route to one branch, layers fan the same
//! arguments out to every child concurrently, chains feed each step from
//! the previous step's result. Failures are logged with the failing
//! entity's identity and name, then propagated unchanged; nothing is
//! retried or swallowed.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::instrument;
use uuid::Uuid;

use crate::args::{CallArgs, map_input_args};
use crate::callable::{CallError, Callable};
use crate::graph::{Chain, ConditionalNode, GraphValue, Layer, LayerChildren, Node, ValidationError};

/// A failure surfaced while invoking a graph value.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecError {
    /// A user-supplied callable failed. The original cause is preserved.
    #[error("callable {name} ({id}) failed")]
    #[diagnostic(code(streamgraph::exec::callable))]
    Callable {
        id: Uuid,
        name: String,
        #[source]
        source: CallError,
    },

    /// Graph-shape or predicate validation failed at an invocation step.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// A layer worker task could not be joined.
    #[error("layer worker for {name} ({id}) did not complete")]
    #[diagnostic(code(streamgraph::exec::join))]
    Join {
        id: Uuid,
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl GraphValue {
    /// Invoke this graph value with the given call arguments.
    ///
    /// Returns the final result value or the first failure encountered,
    /// logged and propagated per the failure policy above.
    #[instrument(skip(self, args), fields(id = %self.id(), name = self.name()))]
    pub async fn invoke(&self, args: CallArgs) -> Result<Value, ExecError> {
        invoke_value(self, args).await
    }
}

impl Node {
    /// Invoke the wrapped callable, mapping arguments unless the callable
    /// is variadic.
    pub async fn invoke(&self, args: CallArgs) -> Result<Value, ExecError> {
        call_leaf(self.id(), self.name(), self.callable(), args)
    }
}

impl ConditionalNode {
    /// Evaluate the predicate and invoke the selected branch with the
    /// original call arguments.
    pub async fn invoke(&self, args: CallArgs) -> Result<Value, ExecError> {
        invoke_conditional(self, args).await
    }
}

impl Layer {
    /// Fan the same call arguments out to every child concurrently and
    /// collect results in submission order.
    pub async fn invoke(&self, args: CallArgs) -> Result<Value, ExecError> {
        invoke_layer(self, args).await
    }
}

impl Chain {
    /// Invoke children in sequence, re-deriving call arguments from each
    /// step's result.
    pub async fn invoke(&self, args: CallArgs) -> Result<Value, ExecError> {
        invoke_chain(self, args).await
    }
}

fn invoke_value<'a>(value: &'a GraphValue, args: CallArgs) -> BoxFuture<'a, Result<Value, ExecError>> {
    Box::pin(async move {
        match value {
            GraphValue::Node(node) => call_leaf(node.id(), node.name(), node.callable(), args),
            GraphValue::Conditional(cond) => invoke_conditional(cond, args).await,
            GraphValue::Layer(layer) => invoke_layer(layer, args).await,
            GraphValue::Chain(chain) => invoke_chain(chain, args).await,
        }
    })
}

/// Run a leaf callable, mapping arguments unless it declares a variadic
/// slot.
fn call_leaf(id: Uuid, name: &str, callable: &Callable, args: CallArgs) -> Result<Value, ExecError> {
    tracing::debug!(%id, name, phase = "start", "invoking callable");
    let result = if callable.signature().accepts_variadic() {
        // Variadic callables see the raw arguments unmapped.
        callable.call(args)
    } else {
        tracing::debug!(%id, name, phase = "argument selection", "mapping call arguments");
        let named = map_input_args(
            &args.positional,
            &args.named,
            callable.signature().parameters(),
        );
        callable.call(CallArgs {
            positional: Vec::new(),
            named,
        })
    };
    match result {
        Ok(value) => {
            tracing::debug!(%id, name, phase = "end", "callable returned");
            Ok(value)
        }
        Err(source) => {
            tracing::error!(%id, name, phase = "error", error = %source, "callable failed");
            Err(ExecError::Callable {
                id,
                name: name.to_string(),
                source,
            })
        }
    }
}

async fn invoke_conditional(cond: &ConditionalNode, args: CallArgs) -> Result<Value, ExecError> {
    let verdict = call_leaf(cond.id(), cond.name(), cond.callable(), args.clone())?;
    let routed_true = match &verdict {
        Value::Bool(b) => *b,
        other => {
            let err = ValidationError::PredicateNotBoolean {
                name: cond.name().to_string(),
                got: json_type_name(other),
            };
            tracing::error!(id = %cond.id(), name = cond.name(), phase = "error", error = %err, "predicate rejected");
            return Err(err.into());
        }
    };
    let branch = if routed_true {
        cond.true_branch()
    } else {
        cond.false_branch()
    };
    tracing::debug!(
        id = %cond.id(),
        name = cond.name(),
        verdict = routed_true,
        "routing conditional branch"
    );
    // The branch receives the original call arguments, not the verdict.
    invoke_value(branch, args).await.inspect_err(|err| {
        tracing::error!(id = %cond.id(), name = cond.name(), phase = "error", error = %err, "branch failed");
    })
}

async fn invoke_chain(chain: &Chain, args: CallArgs) -> Result<Value, ExecError> {
    let (first, rest) = chain
        .children()
        .split_first()
        .ok_or(ValidationError::ChainTooShort { got: 0 })?;
    let mut value = invoke_value(first, args).await.inspect_err(|err| {
        tracing::error!(id = %chain.id(), name = chain.name(), phase = "error", error = %err, "chain step failed");
    })?;
    for child in rest {
        value = invoke_value(child, CallArgs::from_step_result(value))
            .await
            .inspect_err(|err| {
                tracing::error!(id = %chain.id(), name = chain.name(), phase = "error", error = %err, "chain step failed");
            })?;
    }
    Ok(value)
}

async fn invoke_layer(layer: &Layer, args: CallArgs) -> Result<Value, ExecError> {
    let limit = std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1);
    let semaphore = Arc::new(Semaphore::new(limit));

    let mut handles = Vec::with_capacity(layer.children().len());
    for child in layer.children().values() {
        let child = child.clone();
        let child_args = args.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only fails if
            // the pool is torn down mid-flight; run unbounded in that case.
            let _permit = semaphore.acquire_owned().await.ok();
            invoke_value(&child, child_args).await
        }));
    }

    // Join every worker before surfacing anything; the first failure in
    // submission order wins.
    let mut results = Vec::with_capacity(handles.len());
    let mut first_failure: Option<ExecError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(value)) => results.push(value),
            Ok(Err(err)) => {
                results.push(Value::Null);
                first_failure.get_or_insert(err);
            }
            Err(join_err) => {
                results.push(Value::Null);
                first_failure.get_or_insert(ExecError::Join {
                    id: layer.id(),
                    name: layer.name().to_string(),
                    source: join_err,
                });
            }
        }
    }
    if let Some(err) = first_failure {
        tracing::error!(id = %layer.id(), name = layer.name(), phase = "error", error = %err, "layer child failed");
        return Err(err);
    }

    match layer.children() {
        LayerChildren::Ordered(_) => Ok(Value::Array(results)),
        LayerChildren::Named(pairs) => Ok(Value::Object(
            pairs
                .iter()
                .map(|(key, _)| key.clone())
                .zip(results)
                .collect(),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
