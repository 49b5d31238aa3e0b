//! The callable adapter boundary.
//!
//! streamgraph does not reflect over functions; callers describe each
//! wrapped function explicitly with a [`Signature`] (ordered parameter
//! names, variadic markers, declared name, doc string) and pair it with the
//! function object in a [`Callable`]. This is the introspection capability
//! the engine consumes everywhere else.

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::args::CallArgs;

/// Trailing marker appended to a variadic-positional parameter name.
pub const VAR_POSITIONAL_MARKER: &str = "*";
/// Trailing marker appended to a variadic-keyword parameter name.
pub const VAR_KEYWORD_MARKER: &str = "**";

/// Failure raised by a user-supplied callable.
///
/// The engine never interprets these beyond logging and propagation; the
/// original cause is preserved for upstream handling.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(streamgraph::callable::failed))]
pub struct CallError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CallError {
    /// Create an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<serde_json::Error> for CallError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("value conversion failed", err)
    }
}

/// Declared shape of a wrapped function.
///
/// Parameter names are kept in declaration order. Variadic slots carry a
/// trailing `*` (positional) or `**` (keyword) marker and flip
/// [`accepts_variadic`](Self::accepts_variadic), which makes the execution
/// engine pass call arguments through unmapped.
///
/// # Examples
///
/// ```
/// use streamgraph::callable::Signature;
///
/// let sig = Signature::new("resize", ["width", "height"])
///     .with_doc("Scale an image to the given dimensions.");
/// assert_eq!(sig.parameters(), ["width", "height"]);
/// assert!(!sig.accepts_variadic());
///
/// let passthrough = Signature::new("collect", Vec::<String>::new()).with_var_keyword("options");
/// assert_eq!(passthrough.parameters(), ["options**"]);
/// assert!(passthrough.accepts_variadic());
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Signature {
    name: String,
    doc: Option<String>,
    parameters: Vec<String>,
    variadic: bool,
}

impl Signature {
    /// Describe a function by name and ordered parameter names.
    pub fn new(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            doc: None,
            parameters: parameters.into_iter().map(Into::into).collect(),
            variadic: false,
        }
    }

    /// Attach the function's documentation string.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Append a variadic-positional slot (rendered as `name*`).
    #[must_use]
    pub fn with_var_positional(mut self, name: impl Into<String>) -> Self {
        self.parameters
            .push(format!("{}{VAR_POSITIONAL_MARKER}", name.into()));
        self.variadic = true;
        self
    }

    /// Append a variadic-keyword slot (rendered as `name**`).
    #[must_use]
    pub fn with_var_keyword(mut self, name: impl Into<String>) -> Self {
        self.parameters
            .push(format!("{}{VAR_KEYWORD_MARKER}", name.into()));
        self.variadic = true;
        self
    }

    /// The function's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function's documentation string, if any.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Ordered parameter names, variadic markers included.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// True when the function declares a variadic slot.
    ///
    /// Variadic callables receive the raw call arguments unmapped.
    pub fn accepts_variadic(&self) -> bool {
        self.variadic
    }
}

type CallableFn = dyn Fn(CallArgs) -> Result<Value, CallError> + Send + Sync;

/// A plain function paired with its declared [`Signature`].
///
/// Cloning a `Callable` shares the underlying function object; signatures
/// are cloned by value. The graph model treats the pair as immutable.
#[derive(Clone)]
pub struct Callable {
    signature: Signature,
    func: Arc<CallableFn>,
}

impl Callable {
    /// Wrap a function with its declared signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use streamgraph::args::CallArgs;
    /// use streamgraph::callable::{Callable, Signature};
    /// use serde_json::json;
    ///
    /// let double = Callable::new(Signature::new("double", ["x"]), |args: CallArgs| {
    ///     Ok(json!(args.named["x"].as_i64().unwrap_or(0) * 2))
    /// });
    /// let out = double.call(CallArgs::named([("x", json!(4))])).unwrap();
    /// assert_eq!(out, json!(8));
    /// ```
    pub fn new(
        signature: Signature,
        func: impl Fn(CallArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            func: Arc::new(func),
        }
    }

    /// The declared signature supplied at construction.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke the wrapped function.
    pub fn call(&self, args: CallArgs) -> Result<Value, CallError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
