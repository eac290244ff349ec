//! Fir scanner driver.
//!
//! The `firc` binary is a thin argument parser over [`commands`]; the
//! command implementations live in this library so tests can call them on
//! in-memory sources.

use std::sync::Once;

pub mod commands;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=fir_scanner=debug` or `RUST_LOG=fir_scanner=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
