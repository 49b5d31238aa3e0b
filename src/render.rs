//! The remote rendering boundary.
//!
//! A mermaid source is base64-url encoded into a GET path against a
//! remote renderer (mermaid.ink by default) and the returned image bytes
//! are written to a caller-supplied path. A non-success HTTP status is
//! reported through the logging boundary and does not fail the caller;
//! transport and filesystem failures do.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use miette::Diagnostic;
use thiserror::Error;

use crate::diagram::Direction;
use crate::graph::GraphValue;

/// Public image endpoint of the default renderer.
pub const DEFAULT_ENDPOINT: &str = "https://mermaid.ink/img/";

/// Failure reaching the renderer or writing its output.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    /// The HTTP request could not be completed.
    #[error("diagram request failed")]
    #[diagnostic(
        code(streamgraph::render::transport),
        help("Check network connectivity to the renderer endpoint.")
    )]
    Transport(#[from] reqwest::Error),

    /// The rendered image could not be written to disk.
    #[error("could not write rendered diagram")]
    #[diagnostic(code(streamgraph::render::io))]
    Io(#[from] std::io::Error),
}

/// Client for a mermaid-compatible image renderer.
///
/// # Examples
///
/// ```no_run
/// use streamgraph::render::MermaidRenderer;
///
/// # async fn demo() -> Result<(), streamgraph::render::RenderError> {
/// let renderer = MermaidRenderer::new();
/// let saved = renderer
///     .render_to_file("flowchart TB;\na[start];", "diagram.png")
///     .await?;
/// assert!(saved);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MermaidRenderer {
    endpoint: String,
    client: reqwest::Client,
}

impl MermaidRenderer {
    /// Client against the default public endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Client against a custom endpoint (trailing slash included).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// URL-safe base64 form of a mermaid source, as the renderer expects.
    #[must_use]
    pub fn encode(source: &str) -> String {
        URL_SAFE.encode(source.as_bytes())
    }

    /// Fetch the rendered image and write it to `path`.
    ///
    /// Returns `Ok(true)` when the image was written, `Ok(false)` when the
    /// renderer answered with a non-success status (reported, not raised).
    pub async fn render_to_file(
        &self,
        source: &str,
        path: impl AsRef<Path>,
    ) -> Result<bool, RenderError> {
        let url = format!("{}{}", self.endpoint, Self::encode(source));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "failed to generate diagram image");
            return Ok(false);
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(path.as_ref(), &bytes).await?;
        tracing::debug!(path = %path.as_ref().display(), "diagram image written");
        Ok(true)
    }
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphValue {
    /// Render this graph value to a PNG via the default renderer.
    ///
    /// Defaults the output path to `<name>.png` when none is given.
    pub async fn render_png(
        &self,
        direction: Direction,
        path: Option<&Path>,
    ) -> Result<bool, RenderError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(format!("{}.png", self.name())),
        };
        MermaidRenderer::new()
            .render_to_file(&self.mermaid_source(direction), path)
            .await
    }
}
