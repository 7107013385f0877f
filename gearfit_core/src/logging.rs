//! Tracing setup for the gearfit binary and tests.
//!
//! Events go to stderr so equipment and exercise listings on stdout stay
//! pipeable. `GEARFIT_LOG` takes precedence over `RUST_LOG`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "GEARFIT_LOG";

/// Warnings only unless overridden by the environment
pub fn init() {
    init_with_level("warn")
}

pub fn init_with_level(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("gearfit_core=debug"))
        .try_init();
}
