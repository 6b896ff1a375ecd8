//! Tracing initialization.
//!
//! Sets up tracing-subscriber with a console fmt layer. The filter defaults
//! to `info` and can be overridden with the standard `RUST_LOG` variable:
//!
//! ```bash
//! RUST_LOG=subgate=debug,tower_http=debug subgate
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Call once at startup, before any request handling.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
