//! Logging initialization
//!
//! Sets up the tracing subscriber for the embedding application. Kept out
//! of library constructors so tests and hosts control when it runs.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set, otherwise defaults to debug-level output
/// for this crate and info elsewhere. Returns an error if a subscriber is
/// already installed.
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutricounter=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(())
}
