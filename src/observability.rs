//! Tracing setup. Diagnostics go to stderr and stay quiet (`warn`) unless
//! `RELEASE_RUNNER_LOG` asks for more.

use tracing_subscriber::{EnvFilter, prelude::*};

pub const LOG_ENV: &str = "RELEASE_RUNNER_LOG";
pub const LOG_JSON_ENV: &str = "RELEASE_RUNNER_LOG_JSON";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Initialize tracing. Call once at process startup.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let json = std::env::var(LOG_JSON_ENV).is_ok_and(|v| is_truthy(&v));

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
