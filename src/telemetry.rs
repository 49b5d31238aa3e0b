//! Process-wide tracing setup.
//!
//! Execution emits structured `tracing` events carrying each entity's id,
//! display name, and phase; this module wires a default subscriber for
//! binaries and examples that do not install their own.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber at the crate's default level.
///
/// Honors `RUST_LOG` when set. Calling this more than once, or after
/// another subscriber is installed, is a no-op.
pub fn init() {
    init_with_directive("streamgraph=info");
}

/// Install a formatted subscriber with an explicit fallback directive.
pub fn init_with_directive(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}
