// src/cli/mod.rs
//! CLI command handlers.

pub mod args;
pub mod dispatch;
pub mod handlers;

pub use args::Cli;

use tracing_subscriber::EnvFilter;

/// Logs to stderr, filtered by `RUST_LOG` when set, else at `warn`
/// (`debug` with `--verbose`).
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // a second init (as in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
