//! End-to-end tests for the Rustack client runtime.
//!
//! Operations are assembled from the public building blocks exactly as generated client
//! code would assemble them, then run against an in-memory transport. No server is needed.
//!
//! ```text
//! cargo test -p rustack-client-integration
//! ```

use std::sync::Once;

pub mod transport;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

mod test_error;
mod test_operation;
mod test_stack;
