//! Structured logging bootstrap using `tracing`.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "trialcheck=debug,info" } else { "warn" }
}

/// Install the global subscriber. Logs go to stderr so report output on stdout
/// stays machine-readable. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    tracing::debug!(verbose, "tracing initialised");
    Ok(())
}
