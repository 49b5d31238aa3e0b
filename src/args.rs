//! Call arguments and the argument mapper.
//!
//! Every invocation in streamgraph carries a [`CallArgs`]: a positional
//! sequence plus a named map of [`serde_json::Value`]s. Before a
//! non-variadic callable runs, [`map_input_args`] reconciles those values
//! against the callable's declared parameter names.

use rustc_hash::FxHashMap;
use serde_json::Value;

/// Positional and named argument values for one invocation.
///
/// Composite graph values thread a `CallArgs` through their children: a
/// chain re-derives it from the previous step's result via
/// [`from_step_result`](Self::from_step_result), a layer hands every child
/// its own clone.
///
/// # Examples
///
/// ```
/// use streamgraph::args::CallArgs;
/// use serde_json::json;
///
/// let args = CallArgs::positional([json!(1), json!(2)]);
/// assert_eq!(args.positional.len(), 2);
/// assert!(args.named.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    /// Ordered positional values.
    pub positional: Vec<Value>,
    /// Named values keyed by parameter name.
    pub named: FxHashMap<String, Value>,
}

impl CallArgs {
    /// Create an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an argument set from positional values only.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            named: FxHashMap::default(),
        }
    }

    /// Create an argument set from named values only.
    pub fn named(pairs: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Self {
            positional: Vec::new(),
            named: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Derive the arguments for the next chain step from the previous
    /// step's result.
    ///
    /// An array result is spread as positional arguments, an object result
    /// is spread as named arguments, and anything else is passed as a
    /// single positional argument.
    #[must_use]
    pub fn from_step_result(value: Value) -> Self {
        match value {
            Value::Array(items) => Self {
                positional: items,
                named: FxHashMap::default(),
            },
            Value::Object(map) => Self {
                positional: Vec::new(),
                named: map.into_iter().collect(),
            },
            other => Self {
                positional: vec![other],
                named: FxHashMap::default(),
            },
        }
    }

    /// True when neither positional nor named values are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Map positional and named values onto a callable's parameter names.
///
/// Named values whose keys appear in `parameter_names` are seeded first,
/// then positional values fill the still-unassigned parameters in
/// declaration order. Arity mismatches never fail: excess positional values
/// are silently dropped, and missing parameters are simply left unassigned.
/// Call sites depend on that permissive policy, so it must not be
/// tightened here.
///
/// # Examples
///
/// ```
/// use streamgraph::args::map_input_args;
/// use rustc_hash::FxHashMap;
/// use serde_json::json;
///
/// let named: FxHashMap<String, serde_json::Value> =
///     [("b".to_string(), json!(2))].into_iter().collect();
/// let params = vec!["a".to_string(), "b".to_string()];
/// let mapped = map_input_args(&[json!(1)], &named, &params);
/// assert_eq!(mapped["a"], json!(1));
/// assert_eq!(mapped["b"], json!(2));
/// ```
pub fn map_input_args(
    positional: &[Value],
    named: &FxHashMap<String, Value>,
    parameter_names: &[String],
) -> FxHashMap<String, Value> {
    let mut output: FxHashMap<String, Value> = parameter_names
        .iter()
        .filter_map(|name| named.get(name).map(|value| (name.clone(), value.clone())))
        .collect();
    if positional.is_empty() {
        return output;
    }

    let remaining: Vec<&String> = parameter_names
        .iter()
        .filter(|name| !output.contains_key(*name))
        .collect();
    if !remaining.is_empty() {
        // Zip lengths: positional overflow is dropped, parameter overflow
        // stays unassigned.
        for (value, name) in positional.iter().zip(remaining) {
            output.insert(name.clone(), value.clone());
        }
    }
    output
}
