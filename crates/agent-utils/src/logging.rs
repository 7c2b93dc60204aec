//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,agent_stock=info,agent_llm=info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Initialize tracing with a fallback filter directive
///
/// `RUST_LOG` still wins when it is set. Calling this twice is harmless:
/// the second subscriber is silently discarded.
pub fn init_tracing_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
